//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, Step};

/// Fallback shown when the API rejects a submission without a message.
pub const REMOTE_FALLBACK_MESSAGE: &str = "Failed to create company. Please try again.";

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{principal} is not allowed to modify companies")]
    Forbidden { principal: String },

    #[error("step {step} is not complete: {message}")]
    StepIncomplete { step: Step, message: String },

    #[error("{message}")]
    Refused { message: String },

    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("{message}")]
    Remote { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
