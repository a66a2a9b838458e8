//! Error type shared across the crate.

use thiserror::Error;

use super::ids::TaskId;

pub type Result<T> = std::result::Result<T, TriageError>;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("importance must be at least 1, got {0}")]
    InvalidImportance(u32),

    #[error("effort must be at least 1, got {0}")]
    InvalidEffort(u32),

    /// The dependency chain leads back to the task itself. The mutation that
    /// produced this state must be discarded, not written.
    #[error("dependency cycle: {0} would ultimately block itself")]
    CircularDependency(TaskId),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("event publish error: {0}")]
    Publish(String),
}
