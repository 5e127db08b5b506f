use std::path::PathBuf;

use thiserror::Error;

use crate::fs::node::NodeId;
use crate::terminal::event::DecodeError;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from the terminal device.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A stat or directory read failed for a specific node.
    #[error("Cannot read {}: {}", .path.display(), .source)]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Expand/collapse requested on something that is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotExpandable(PathBuf),

    /// A node id that is not (or no longer) part of the tree.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Malformed input bytes from the terminal.
    #[error("Input decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl AppError {
    /// Wrap an I/O error with the path it happened on.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether the session can carry on after this error.
    ///
    /// Device and setup failures end the session; everything that is scoped
    /// to one node or one keystroke does not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Filesystem { .. }
                | AppError::NotExpandable(_)
                | AppError::UnknownNode(_)
                | AppError::Decode(_)
        )
    }
}
