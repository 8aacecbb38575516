//! Application layer: format dispatch and document use cases
//!
//! This layer orchestrates domain logic and the file formats.

pub mod documents;
pub mod error;
pub mod format;

pub use documents::{import_foreign, load, merge_file, new_document, save};
pub use error::{ApplicationError, ApplicationResult};
pub use format::FileFormat;
