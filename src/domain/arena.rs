use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Name given to the root of a fresh document.
pub const DEFAULT_ROOT_NAME: &str = "Root";

/// Name given to nodes added without an explicit name.
pub const DEFAULT_NODE_NAME: &str = "New Node";

/// Handle to a node inside one [`Document`].
///
/// Handles are only meaningful for the document that issued them. A handle
/// whose node has been deleted is rejected with [`DomainError::UnknownNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{slot}.{generation}")
    }
}

/// A single entry of the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Label shown in the tree view, not required to be unique
    pub name: String,
    /// Opaque marked-up text blob
    pub content: String,
    /// Owning parent, None for the document root and detached nodes
    parent: Option<NodeId>,
    /// Ordered children, each owned exclusively by this node
    children: Vec<NodeId>,
}

impl Node {
    fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed ordered tree of named nodes.
///
/// The arena owns every node; `parent` is a non-owning back-reference and
/// `children` is the owning, ordered list. Every mutating method keeps the
/// two in sync: a node with `parent == Some(p)` appears exactly once in
/// `p`'s children.
///
/// Nodes detached with [`Document::remove_node`] stay in the arena (so a
/// caller can re-attach them, e.g. cut and paste) until
/// [`Document::delete_node`] frees them.
#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME)
    }
}

impl PartialEq for Document {
    /// Structural equality of the trees reachable from the roots.
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

impl Eq for Document {}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_content(name, "")
    }

    pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Node::new(name, content)));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self.arena[self.root.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id.0)
    }

    /// Like [`Document::get`], but a stale handle is a contract error.
    pub fn node(&self, id: NodeId) -> DomainResult<&Node> {
        self.arena.get(id.0).ok_or(DomainError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> DomainResult<()> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> DomainResult<()> {
        self.node_mut(id)?.content = content.into();
        Ok(())
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut Node> {
        self.arena.get_mut(id.0).ok_or(DomainError::UnknownNode(id))
    }

    /// Creates a detached node. Attach it with [`Document::add_child`].
    pub fn create_node(&mut self, name: impl Into<String>, content: impl Into<String>) -> NodeId {
        NodeId(self.arena.insert(Node::new(name, content)))
    }

    /// Creates a node and appends it to `parent`'s children.
    #[instrument(level = "trace", skip(self, name, content))]
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> DomainResult<NodeId> {
        self.node(parent)?;
        Ok(self.push_child(parent, name, content))
    }

    /// Appends a fresh node under a parent known to be live.
    pub(crate) fn push_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> NodeId {
        let id = self.create_node(name, content);
        self.link(parent, id);
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.arena[child.0].parent = Some(parent);
        self.arena[parent.0].children.push(child);
    }

    /// Removes `node` from its parent's children and clears its parent.
    /// Returns the former parent and position.
    fn detach(&mut self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.arena[node.0].parent.take()?;
        let siblings = &mut self.arena[parent.0].children;
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.remove(index);
        Some((parent, index))
    }

    /// Parent of `node` and the node's index among its siblings.
    fn position(&self, node: NodeId) -> DomainResult<Option<(NodeId, usize)>> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(None);
        };
        Ok(self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == node)
            .map(|index| (parent, index)))
    }

    /// True if `ancestor` lies strictly above `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.get(node).and_then(Node::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(Node::parent);
        }
        false
    }

    /// Appends a detached node to `parent`'s children.
    ///
    /// A child that still has a parent is rejected rather than silently
    /// re-parented; call [`Document::remove_node`] first. The document root
    /// never gets a parent.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.node(parent)?;
        if child == self.root {
            return Err(DomainError::RootNotAttachable(child));
        }
        if self.node(child)?.parent.is_some() {
            return Err(DomainError::AlreadyAttached(child));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DomainError::CycleDetected { parent, child });
        }
        self.link(parent, child);
        Ok(())
    }

    /// Detaches `child` if it is currently a child of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent == Some(parent) {
            self.detach(child);
        }
        Ok(())
    }

    /// Detaches `node` from its parent. No-op for parentless nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_node(&mut self, node: NodeId) -> DomainResult<()> {
        self.node(node)?;
        if let Some((parent, index)) = self.detach(node) {
            debug!("detached {} from {} at {}", node, parent, index);
        }
        Ok(())
    }

    /// Detaches `node` and frees its whole subtree. The root is never deleted.
    #[instrument(level = "trace", skip(self))]
    pub fn delete_node(&mut self, node: NodeId) -> DomainResult<()> {
        self.node(node)?;
        if node == self.root {
            return Ok(());
        }
        self.detach(node);
        let doomed: Vec<NodeId> = self.descendants(node).map(|(id, _, _)| id).collect();
        for id in &doomed {
            self.arena.remove(id.0);
        }
        debug!("deleted {} nodes under {}", doomed.len(), node);
        Ok(())
    }

    /// Swaps `node` with its previous sibling.
    #[instrument(level = "trace", skip(self))]
    pub fn move_up(&mut self, node: NodeId) -> DomainResult<()> {
        if let Some((parent, index)) = self.position(node)? {
            if index > 0 {
                self.arena[parent.0].children.swap(index, index - 1);
            }
        }
        Ok(())
    }

    /// Swaps `node` with its next sibling.
    #[instrument(level = "trace", skip(self))]
    pub fn move_down(&mut self, node: NodeId) -> DomainResult<()> {
        if let Some((parent, index)) = self.position(node)? {
            let siblings = &mut self.arena[parent.0].children;
            if index + 1 < siblings.len() {
                siblings.swap(index, index + 1);
            }
        }
        Ok(())
    }

    /// Makes `node` the last child of its previous sibling.
    #[instrument(level = "trace", skip(self))]
    pub fn indent(&mut self, node: NodeId) -> DomainResult<()> {
        let Some((parent, index)) = self.position(node)? else {
            return Ok(());
        };
        if index == 0 {
            return Ok(());
        }
        let new_parent = self.arena[parent.0].children[index - 1];
        self.detach(node);
        self.link(new_parent, node);
        Ok(())
    }

    /// Moves `node` up one level, right after its former parent.
    ///
    /// No-op for top-level nodes (whose parent has no parent).
    #[instrument(level = "trace", skip(self))]
    pub fn outdent(&mut self, node: NodeId) -> DomainResult<()> {
        let Some((parent, _)) = self.position(node)? else {
            return Ok(());
        };
        let Some((grandparent, parent_index)) = self.position(parent)? else {
            return Ok(());
        };
        self.detach(node);
        self.arena[node.0].parent = Some(grandparent);
        self.arena[grandparent.0]
            .children
            .insert(parent_index + 1, node);
        Ok(())
    }

    /// Deep copy of the subtree at `node` as a new, independent document.
    ///
    /// The copy's root has no parent regardless of where `node` sits.
    #[instrument(level = "trace", skip(self))]
    pub fn copy(&self, node: NodeId) -> DomainResult<Document> {
        let source = self.node(node)?;
        let mut copy = Document::with_content(source.name.clone(), source.content.clone());
        let root = copy.root;
        copy.copy_children(root, self, node);
        Ok(copy)
    }

    /// Appends a deep copy of `other`'s whole tree under `parent`.
    pub fn graft(&mut self, parent: NodeId, other: &Document) -> DomainResult<NodeId> {
        self.graft_subtree(parent, other, other.root)
    }

    /// Appends a deep copy of `source`'s subtree at `node` under `parent`.
    #[instrument(level = "trace", skip(self, source))]
    pub fn graft_subtree(
        &mut self,
        parent: NodeId,
        source: &Document,
        node: NodeId,
    ) -> DomainResult<NodeId> {
        self.node(parent)?;
        let original = source.node(node)?;
        let id = self.push_child(parent, original.name.clone(), original.content.clone());
        self.copy_children(id, source, node);
        Ok(id)
    }

    fn copy_children(&mut self, target: NodeId, source: &Document, from: NodeId) {
        let mut pending = vec![(from, target)];
        while let Some((from, to)) = pending.pop() {
            for &child in &source.arena[from.0].children {
                let original = &source.arena[child.0];
                let copy = self.push_child(to, original.name.clone(), original.content.clone());
                pending.push((child, copy));
            }
        }
    }

    /// Index path from the root to `node`; empty for the root itself.
    ///
    /// None if the node is unknown or not reachable from the root.
    pub fn path_of(&self, node: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = node;
        while current != self.root {
            let parent = self.get(current)?.parent?;
            let index = self.get(parent)?.children.iter().position(|&c| c == current)?;
            path.push(index);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Follows an index path from the root.
    pub fn resolve(&self, path: &[usize]) -> Option<NodeId> {
        path.iter().try_fold(self.root, |id, &index| {
            self.get(id)?.children.get(index).copied()
        })
    }

    /// Pre-order walk of the tree reachable from the root.
    pub fn iter(&self) -> PreOrderIter<'_> {
        self.descendants(self.root)
    }

    /// Pre-order walk of `node` and everything below it.
    pub fn descendants(&self, node: NodeId) -> PreOrderIter<'_> {
        PreOrderIter::new(self, node)
    }

    pub fn iter_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.root)
    }

    /// Number of nodes reachable from the root, root included.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels; a lone root has depth 1.
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, _, depth)| depth + 1).max().unwrap_or(0)
    }

    /// Compares names, contents and child order of two subtrees.
    pub fn subtree_eq(&self, node: NodeId, other: &Document, other_node: NodeId) -> bool {
        let mut pending = vec![(node, other_node)];
        while let Some((a, b)) = pending.pop() {
            let (Some(left), Some(right)) = (self.get(a), other.get(b)) else {
                return false;
            };
            if left.name != right.name
                || left.content != right.content
                || left.children.len() != right.children.len()
            {
                return false;
            }
            pending.extend(left.children.iter().copied().zip(right.children.iter().copied()));
        }
        true
    }
}

pub struct PreOrderIter<'a> {
    document: &'a Document,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> PreOrderIter<'a> {
    fn new(document: &'a Document, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if document.contains(start) {
            stack.push((start, 0));
        }
        Self { document, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    /// Node handle, node, depth below the starting node.
    type Item = (NodeId, &'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let node = self.document.get(id)?;
        // Push children in reverse order for left-to-right traversal
        for &child in node.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((id, node, depth))
    }
}

pub struct PostOrderIter<'a> {
    document: &'a Document,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIter<'a> {
    fn new(document: &'a Document, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if document.contains(start) {
            stack.push((start, false));
        }
        Self { document, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, visited)) = self.stack.pop() {
            if let Some(node) = self.document.get(id) {
                if visited {
                    return Some((id, node));
                }
                self.stack.push((id, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}
