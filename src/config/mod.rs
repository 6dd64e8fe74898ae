//! Configuration models for timing, pool sizing, and classification.

pub mod pipeline;

pub use pipeline::{PipelineConfig, PriorityConfig, TimingConfig};
