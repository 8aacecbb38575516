//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    #[error("cannot render output: {0}")]
    Output(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Output(_) => exitcode::SOFTWARE,
            CliError::Application(e) => match e {
                ApplicationError::Infra(infra) if infra.is_not_found() => exitcode::NOINPUT,
                ApplicationError::Infra(infra) if infra.is_format() => exitcode::DATAERR,
                ApplicationError::Infra(_) => exitcode::IOERR,
                ApplicationError::UnsupportedFormat { .. } => exitcode::DATAERR,
                ApplicationError::Domain(_) => exitcode::SOFTWARE,
                ApplicationError::Config { .. } => exitcode::CONFIG,
            },
        }
    }
}
