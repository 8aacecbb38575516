//! Application-level errors (wraps domain and infrastructure errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// Application errors wrap lower layers and add dispatch/config concerns.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// True for malformed file contents (not I/O, not dispatch).
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Infra(e) if e.is_format())
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
