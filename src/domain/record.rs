//! Nested, serde-friendly form of a document tree.

use serde::{Deserialize, Serialize};

use crate::domain::arena::{Document, NodeId};
use crate::domain::error::{DomainError, DomainResult};

/// One node with its children inlined, e.g. for JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NodeRecord>) -> Self {
        self.children = children;
        self
    }
}

// Nested records are torn down level by level instead of through the
// recursive drop glue.
impl Drop for NodeRecord {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut record) = pending.pop() {
            pending.append(&mut record.children);
        }
    }
}

impl Document {
    /// Nested copy of the subtree under `node`, built without recursion.
    pub fn to_record(&self, node: NodeId) -> DomainResult<NodeRecord> {
        let top = self.node(node)?;
        // (node, its record so far, index of the next child to visit)
        let mut stack = vec![(top, NodeRecord::new(top.name.clone(), top.content.clone()), 0)];
        let mut finished = None;
        while let Some((current, _, next)) = stack.last_mut() {
            if let Some(&child) = current.children().get(*next) {
                *next += 1;
                let child = self.node(child)?;
                stack.push((child, NodeRecord::new(child.name.clone(), child.content.clone()), 0));
            } else if let Some((_, done, _)) = stack.pop() {
                match stack.last_mut() {
                    Some((_, parent, _)) => parent.children.push(done),
                    None => finished = Some(done),
                }
            }
        }
        finished.ok_or(DomainError::UnknownNode(node))
    }

    pub fn from_record(record: &NodeRecord) -> Document {
        let mut document = Document::with_content(record.name.clone(), record.content.clone());
        let mut pending = vec![(record, document.root())];
        while let Some((record, parent)) = pending.pop() {
            for child in &record.children {
                let id = document.push_child(parent, child.name.clone(), child.content.clone());
                pending.push((child, id));
            }
        }
        document
    }
}
