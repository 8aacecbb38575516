//! Additive merge of one document into another.

use tracing::{info, instrument};

use crate::domain::arena::{Document, NodeId};
use crate::domain::error::DomainResult;

/// Appends deep copies of `incoming`'s top-level nodes to `base`'s root.
///
/// Flat append in `incoming` order; nodes are never matched by name.
/// `incoming` is only read. Returns the handles of the new nodes in `base`.
///
/// To merge a document into itself, clone it first:
/// `merge_trees(&mut doc, &doc.clone())`.
pub fn merge_trees(base: &mut Document, incoming: &Document) -> DomainResult<Vec<NodeId>> {
    let target = base.root();
    merge_into(base, target, incoming, incoming.root())
}

/// Appends deep copies of `source`'s children to `target`.
#[instrument(level = "debug", skip(base, incoming))]
pub fn merge_into(
    base: &mut Document,
    target: NodeId,
    incoming: &Document,
    source: NodeId,
) -> DomainResult<Vec<NodeId>> {
    base.node(target)?;
    let children = incoming.node(source)?.children();
    let mut added = Vec::with_capacity(children.len());
    for &child in children {
        added.push(base.graft_subtree(target, incoming, child)?);
    }
    info!("merged {} top-level nodes into {}", added.len(), target);
    Ok(added)
}
