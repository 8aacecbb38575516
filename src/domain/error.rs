//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent contract violations on the tree model.
///
/// Structural edge cases (moving the first child up, outdenting a
/// top-level node, ...) are not errors; those calls are silent no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node {0} does not belong to this document")]
    UnknownNode(NodeId),

    #[error("node {0} already has a parent; detach it first")]
    AlreadyAttached(NodeId),

    #[error("attaching node {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },

    #[error("node {0} is the document root and cannot be attached")]
    RootNotAttachable(NodeId),
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
