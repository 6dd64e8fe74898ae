//! Error types for engine operations.

use thiserror::Error;

/// Errors produced when wiring up or spawning the pipeline.
///
/// Storage failures are deliberately absent: the pipeline recovers from them
/// locally (skip the cycle, abandon the activation, leak the dataset) and
/// only logs, so they never surface through a `Result`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The kernel could not create a schedulable task.
    #[error("task spawn failed: {0}")]
    Spawn(String),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
