//! Shared utilities.

pub mod rng;
pub mod telemetry;

pub use rng::{random_blob_name, NormalSource};
pub use telemetry::init_tracing;
