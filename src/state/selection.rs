use std::collections::HashMap;

use crate::fs::NodeId;

/// Multi-selection in selection order, plus single-character marks.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: Vec<NodeId>,
    marks: HashMap<char, NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// Flip membership of `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.selected.iter().position(|s| *s == id) {
            Some(index) => {
                self.selected.remove(index);
                false
            }
            None => {
                self.selected.push(id);
                true
            }
        }
    }

    /// Add `id` if absent. Returns whether it was added.
    pub fn select(&mut self, id: NodeId) -> bool {
        if self.is_selected(id) {
            return false;
        }
        self.selected.push(id);
        true
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    /// Empty the selection, handing back what was in it.
    pub fn clear(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.selected)
    }

    /// Drop selected ids and marks whose nodes no longer exist.
    pub fn prune(&mut self, is_live: impl Fn(NodeId) -> bool) {
        self.selected.retain(|id| is_live(*id));
        self.marks.retain(|_, id| is_live(*id));
    }

    pub fn set_mark(&mut self, mark: char, id: NodeId) {
        self.marks.insert(mark, id);
    }

    pub fn mark(&self, mark: char) -> Option<NodeId> {
        self.marks.get(&mark).copied()
    }

    pub fn clear_marks(&mut self) {
        self.marks.clear();
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }
}
