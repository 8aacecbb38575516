//! Infrastructure-level errors: file I/O and on-disk formats

use std::path::PathBuf;

use thiserror::Error;

use crate::infrastructure::lts::LtsError;

/// Errors raised while reading or writing document files.
///
/// Everything except [`InfraError::Io`] is a format error: the file was
/// readable but its contents are not what the format requires.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid LTS file {}: {source}", path.display())]
    Lts {
        path: PathBuf,
        #[source]
        source: LtsError,
    },

    #[error("invalid XML in CherryTree file {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },

    #[error("not a valid NoteCase database {}: {message}", path.display())]
    InvalidStore { path: PathBuf, message: String },

    #[error("NoteCase database {} lacks the expected nodes table or columns: {message}", path.display())]
    MissingSchema { path: PathBuf, message: String },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for malformed content, false for plain I/O failures.
    pub fn is_format(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
