// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid job status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Machine not found: {0}")]
    MachineNotFound(String),

    #[error("Machine is offline: {0}")]
    MachineOffline(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(i32),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
