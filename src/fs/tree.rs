use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::fs::node::{NodeId, TreeNode};

/// Options that affect how directory entries are turned into nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Stat children through symlinks so linked directories become expandable.
    pub follow_symlinks: bool,
}

/// Lazily loaded filesystem tree.
///
/// The tree starts with just the root node. A directory is only read the
/// first time it is expanded; collapsing keeps its children in memory and
/// only `refresh_node` throws them away.
#[derive(Debug, Default)]
pub struct FileTree {
    nodes: HashMap<NodeId, TreeNode>,
    root: Option<NodeId>,
    current: Option<NodeId>,
    next_id: usize,
    options: LoadOptions,
}

impl FileTree {
    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Stat `path` and make it the (unexpanded, unloaded) root.
    ///
    /// Any previous tree is dropped.
    pub fn load_root(&mut self, path: &Path) -> Result<NodeId> {
        let metadata = fs::metadata(path).map_err(|e| AppError::filesystem(path, e))?;

        self.nodes.clear();
        let id = self.alloc_id();
        let node = TreeNode::from_metadata(id, path, &metadata, None);
        tracing::debug!(path = %path.display(), "loaded root");
        self.nodes.insert(id, node);
        self.root = Some(id);
        self.current = Some(id);
        Ok(id)
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.and_then(|id| self.node(id))
    }

    pub fn current_id(&self) -> Option<NodeId> {
        self.current
    }

    pub fn current_node(&self) -> Option<&TreeNode> {
        self.current.and_then(|id| self.node(id))
    }

    /// Point the tree's own cursor at `id`.
    pub fn set_current_node(&mut self, id: NodeId) -> Result<()> {
        if !self.contains(id) {
            return Err(AppError::UnknownNode(id));
        }
        self.current = Some(id);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Number of edges between `id` and the root (root is 0).
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// The chain from the root down to and including `id`.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.node(id).map(|n| n.id);
        while let Some(node_id) = current {
            chain.push(node_id);
            current = self.parent(node_id);
        }
        chain.reverse();
        chain
    }

    #[cfg(test)]
    pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id)?
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).is_some_and(|c| c.name == name))
    }

    /// Set the advisory multi-select flag.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(AppError::UnknownNode(id))?;
        node.selected = selected;
        Ok(())
    }

    /// Open a directory, reading it from disk on first use.
    pub fn expand_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id).ok_or(AppError::UnknownNode(id))?;
        if !node.can_expand() {
            return Err(AppError::NotExpandable(node.path.clone()));
        }
        if node.expanded {
            return Ok(());
        }
        if !node.loaded {
            self.load_children(id)?;
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.expanded = true;
        }
        Ok(())
    }

    /// Hide a directory's children. They stay loaded.
    pub fn collapse_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(AppError::UnknownNode(id))?;
        if !node.can_expand() {
            return Err(AppError::NotExpandable(node.path.clone()));
        }
        node.expanded = false;
        Ok(())
    }

    /// Discard a directory's subtree and read it again.
    ///
    /// The old descendants are removed from the tree, so their ids stop
    /// resolving. If the re-read fails the directory is left collapsed and
    /// unloaded.
    pub fn refresh_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id).ok_or(AppError::UnknownNode(id))?;
        if !node.is_dir() {
            return Ok(());
        }

        let children = node.children.clone();
        for child in children {
            self.remove_subtree(child);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children.clear();
            node.loaded = false;
            node.expanded = false;
        }
        if self.current.is_some_and(|c| !self.contains(c)) {
            self.current = Some(id);
        }

        self.expand_node(id)
    }

    fn load_children(&mut self, id: NodeId) -> Result<()> {
        let path = match self.node(id) {
            Some(node) => node.path.clone(),
            None => return Err(AppError::UnknownNode(id)),
        };

        let entries = fs::read_dir(&path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to read directory");
            AppError::filesystem(&path, e)
        })?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let child_path = entry.path();
            let metadata = if self.options.follow_symlinks {
                fs::metadata(&child_path)
            } else {
                entry.metadata()
            };
            let metadata = match metadata {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(path = %child_path.display(), error = %e, "skipping entry");
                    continue;
                }
            };
            let child_id = self.alloc_id();
            let child = TreeNode::from_metadata(child_id, &child_path, &metadata, Some(id));
            self.nodes.insert(child_id, child);
            children.push(child_id);
        }

        tracing::debug!(path = %path.display(), count = children.len(), "loaded directory");
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
            node.loaded = true;
        }
        Ok(())
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}
