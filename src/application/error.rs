//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("weight configuration not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid weight configuration {path}: {message}")]
    InvalidWeightConfig { path: PathBuf, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("input closed before the session finished")]
    InputClosed,

    #[error("session is not expecting {0}")]
    SessionState(&'static str),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
