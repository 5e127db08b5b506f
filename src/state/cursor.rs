use std::collections::VecDeque;

use crate::fs::NodeId;

/// The UI cursor plus a bounded jump history for going back.
#[derive(Debug, Clone)]
pub struct CursorState {
    current: Option<NodeId>,
    history: VecDeque<NodeId>,
    max_history: usize,
}

impl CursorState {
    pub fn new(max_history: usize) -> Self {
        Self {
            current: None,
            history: VecDeque::new(),
            max_history: max_history.max(1),
        }
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Step the cursor without touching history (line-by-line movement).
    pub fn set(&mut self, id: NodeId) {
        self.current = Some(id);
    }

    /// Jump to `id`, remembering where the cursor was.
    pub fn move_to(&mut self, id: NodeId) {
        if let Some(prev) = self.current {
            if prev != id {
                self.history.push_back(prev);
                if self.history.len() > self.max_history {
                    self.history.pop_front();
                }
            }
        }
        self.current = Some(id);
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Return to the most recent live history entry.
    ///
    /// Entries for which `is_live` is false (nodes discarded by a refresh)
    /// are dropped along the way.
    pub fn go_back(&mut self, is_live: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        while let Some(id) = self.history.pop_back() {
            if is_live(id) {
                self.current = Some(id);
                return Some(id);
            }
        }
        None
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_HISTORY)
    }
}
