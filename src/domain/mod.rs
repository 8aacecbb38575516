//! Domain layer: the document tree and its structural operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod merge;
pub mod record;

pub use arena::{
    Document, Node, NodeId, PostOrderIter, PreOrderIter, DEFAULT_NODE_NAME, DEFAULT_ROOT_NAME,
};
pub use error::{DomainError, DomainResult};
pub use merge::{merge_into, merge_trees};
pub use record::NodeRecord;
