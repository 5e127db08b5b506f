use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Handle to a node stored in a `FileTree`. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Type of filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    Symlink,
}

/// File metadata captured when the node was created.
#[derive(Debug, Clone)]
pub struct FileMeta {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_hidden: bool,
}

/// A node in the filesystem tree.
///
/// Expansion and load state are only changed by `FileTree`, which keeps the
/// invariant that non-directories are never expanded and never have children.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub meta: FileMeta,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) expanded: bool,
    pub(super) loaded: bool,
    pub(super) selected: bool,
}

impl TreeNode {
    /// Build a node from already-fetched metadata.
    pub fn from_metadata(id: NodeId, path: &Path, metadata: &Metadata, parent: Option<NodeId>) -> Self {
        let name = display_name(path);

        let kind = if metadata.file_type().is_symlink() {
            NodeKind::Symlink
        } else if metadata.is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::File
        };

        let meta = FileMeta {
            size: metadata.len(),
            modified: metadata.modified().ok(),
            is_hidden: name.starts_with('.'),
        };

        Self {
            id,
            name,
            path: path.to_path_buf(),
            kind,
            meta,
            parent,
            children: Vec::new(),
            expanded: false,
            loaded: false,
            selected: false,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Only directories can be expanded or collapsed.
    pub fn can_expand(&self) -> bool {
        self.is_dir()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_hidden(&self) -> bool {
        self.meta.is_hidden
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in directory-listing order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Name with an open/closed marker for directories.
    pub fn display_name(&self, ascii: bool) -> String {
        if !self.is_dir() {
            return self.name.clone();
        }
        let marker = match (self.expanded, ascii) {
            (true, false) => "▼ ",
            (false, false) => "▶ ",
            (true, true) => "[-] ",
            (false, true) => "[+] ",
        };
        format!("{}{}", marker, self.name)
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            NodeKind::Directory => 'D',
            NodeKind::Symlink => 'L',
            NodeKind::File => 'F',
        };
        write!(f, "[{}] {}", tag, self.path.display())
    }
}

/// Last path component, or the whole path for roots like `/`.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
