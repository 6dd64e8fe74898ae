//! Core scheduling state and algorithms.

pub mod consensus;
pub mod descriptor;
pub mod error;
pub mod scheduler;

pub use consensus::{majority, Consensus};
pub use descriptor::{
    DescriptorTable, Laxity, TaskDescriptor, DISPATCHER_SLOT, LOAD_SLOT, PRODUCER_SLOT,
    WORKER_BASE_SLOT,
};
pub use error::{AppResult, PipelineError};
pub use scheduler::LaxityScheduler;
