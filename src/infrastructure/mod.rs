//! Infrastructure layer: document file formats
//!
//! The native LTS binary codec plus importers for foreign outliner formats.

pub mod cherrytree;
pub mod error;
pub mod error_ext;
pub mod lts;
pub mod notecase;

pub use error::{InfraError, InfraResult};
pub use error_ext::IoResultExt;

/// Name used when a foreign node carries no usable title.
pub const UNTITLED: &str = "Untitled";
