//! LiteStone: a hierarchical note document model with a compact binary
//! format and importers for CherryTree and NoteCase outlines.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use application::{
    import_foreign, load, merge_file, new_document, save, ApplicationError, ApplicationResult,
    FileFormat,
};
pub use config::Settings;
pub use domain::{merge_trees, Document, DomainError, Node, NodeId};
