pub mod node;
pub mod tree;
pub mod walker;

pub use node::{NodeId, TreeNode};
pub use tree::{FileTree, LoadOptions};
pub use walker::Walker;
