//! UI state kept alongside the file tree: cursor, selection and view.

pub mod cursor;
pub mod selection;
pub mod view;

pub use cursor::CursorState;
pub use selection::SelectionState;
pub use view::{InputMode, ViewMode, ViewState};
