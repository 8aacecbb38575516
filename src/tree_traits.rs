/*
Rendering lives in a trait so front ends can pick it up with a single import
next to the document types.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{Document, NodeId};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Document {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let label = move |node_idx: NodeId| match self.get(node_idx) {
            Some(node) => node.name.clone(),
            None => format!("<missing {node_idx}>"),
        };
        let children = move |node_idx: NodeId| {
            self.get(node_idx)
                .map(|node| node.children())
                .unwrap_or_default()
        };

        // (node, its tree so far, index of the next child to visit)
        let mut stack = vec![(self.root(), Tree::new(label(self.root())), 0)];
        let mut finished = Tree::new(String::new());
        while let Some((node_idx, _, next)) = stack.last_mut() {
            if let Some(&child) = children(*node_idx).get(*next) {
                *next += 1;
                stack.push((child, Tree::new(label(child)), 0));
            } else if let Some((_, done, _)) = stack.pop() {
                match stack.last_mut() {
                    Some((_, parent, _)) => {
                        parent.push(done);
                    }
                    None => finished = done,
                }
            }
        }
        finished
    }
}
