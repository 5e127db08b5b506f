use std::convert::Infallible;

use globset::Glob;

use crate::error::{AppError, Result};
use crate::fs::node::{NodeId, TreeNode};
use crate::fs::tree::FileTree;

/// Decides whether a traversal continues into a node's children.
type Gate = fn(&TreeNode) -> bool;

/// Descend only into directories the user has open.
fn expanded_gate(node: &TreeNode) -> bool {
    node.is_dir() && node.is_expanded()
}

/// Descend into every directory that has been read, open or not.
fn loaded_gate(node: &TreeNode) -> bool {
    node.is_dir() && node.is_loaded()
}

/// Read-only traversals over a `FileTree`.
///
/// Nothing is cached: every call walks the tree as it is right now.
#[derive(Debug, Clone, Copy)]
pub struct Walker<'a> {
    tree: &'a FileTree,
}

impl<'a> Walker<'a> {
    pub fn new(tree: &'a FileTree) -> Self {
        Self { tree }
    }

    /// All nodes the user can currently see, in display order.
    ///
    /// The root is always included; a node's children follow it only when it
    /// is an expanded directory.
    pub fn visible_nodes(&self) -> Vec<&'a TreeNode> {
        let mut visible = Vec::new();
        if let Some(root) = self.tree.root_id() {
            self.collect(root, expanded_gate, |_| true, &mut visible);
        }
        visible
    }

    /// Position of `id` in the visible sequence.
    pub fn visible_index(&self, id: NodeId) -> Option<usize> {
        self.visible_nodes().iter().position(|node| node.id == id)
    }

    pub fn next_visible(&self, current: NodeId) -> Option<&'a TreeNode> {
        let visible = self.visible_nodes();
        let index = visible.iter().position(|node| node.id == current)?;
        visible.get(index + 1).copied()
    }

    pub fn prev_visible(&self, current: NodeId) -> Option<&'a TreeNode> {
        let visible = self.visible_nodes();
        let index = visible.iter().position(|node| node.id == current)?;
        index.checked_sub(1).and_then(|i| visible.get(i).copied())
    }

    /// Case-insensitive substring match on names.
    pub fn find_by_name(&self, query: &str) -> Vec<&'a TreeNode> {
        let query = query.to_lowercase();
        self.search(|node| node.name.to_lowercase().contains(&query))
    }

    /// Case-insensitive suffix match on file names. A leading `.` is optional.
    pub fn find_by_extension(&self, ext: &str) -> Vec<&'a TreeNode> {
        let ext = if ext.starts_with('.') {
            ext.to_lowercase()
        } else {
            format!(".{}", ext.to_lowercase())
        };
        self.search(|node| !node.is_dir() && node.name.to_lowercase().ends_with(&ext))
    }

    /// Shell-glob match against the base name. A malformed pattern matches
    /// nothing.
    pub fn find_by_pattern(&self, pattern: &str) -> Vec<&'a TreeNode> {
        let matcher = match Glob::new(pattern) {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "invalid glob");
                return Vec::new();
            }
        };
        self.search(|node| matcher.is_match(&node.name))
    }

    /// Every loaded node, minus dotfiles unless `show_hidden` is set.
    pub fn filter_hidden(&self, show_hidden: bool) -> Vec<&'a TreeNode> {
        self.search(|node| show_hidden || !node.is_hidden())
    }

    /// Pre-order walk over every loaded node from the root.
    ///
    /// The first error returned by `visit` stops the walk and is returned.
    /// Visits that already happened are not undone.
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&'a TreeNode) -> Result<()>,
    {
        match self.tree.root_id() {
            Some(root) => self.descend(root, loaded_gate, &mut visit),
            None => Ok(()),
        }
    }

    /// Like `walk`, starting at `start` instead of the root.
    pub fn walk_from<F>(&self, start: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&'a TreeNode) -> Result<()>,
    {
        if !self.tree.contains(start) {
            return Err(AppError::UnknownNode(start));
        }
        self.descend(start, loaded_gate, &mut visit)
    }

    pub fn collect_where<P>(&self, predicate: P) -> Vec<&'a TreeNode>
    where
        P: Fn(&TreeNode) -> bool,
    {
        self.search(predicate)
    }

    pub fn collect_all(&self) -> Vec<&'a TreeNode> {
        self.search(|_| true)
    }

    fn search<P>(&self, predicate: P) -> Vec<&'a TreeNode>
    where
        P: Fn(&TreeNode) -> bool,
    {
        let mut results = Vec::new();
        if let Some(root) = self.tree.root_id() {
            self.collect(root, loaded_gate, predicate, &mut results);
        }
        results
    }

    fn collect<P>(&self, start: NodeId, gate: Gate, predicate: P, out: &mut Vec<&'a TreeNode>)
    where
        P: Fn(&TreeNode) -> bool,
    {
        let walked = self.descend::<Infallible, _>(start, gate, &mut |node: &'a TreeNode| {
            if predicate(node) {
                out.push(node);
            }
            Ok(())
        });
        match walked {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Iterative pre-order traversal that enters a node's children only when
    /// `gate` allows it.
    fn descend<E, F>(&self, start: NodeId, gate: Gate, visit: &mut F) -> std::result::Result<(), E>
    where
        F: FnMut(&'a TreeNode) -> std::result::Result<(), E>,
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            visit(node)?;
            if gate(node) {
                stack.extend(node.children().iter().rev().copied());
            }
        }
        Ok(())
    }
}
