use crate::fs::NodeId;

/// What occupies the main area.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Normal,
    /// The search prompt is open and keys edit the query.
    Search,
    Help,
}

/// Whether the next character completes a pending two-key command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    WaitingForMark,
    WaitingForJump,
}

/// Scroll position, display toggles, prompts and search results.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub scroll_offset: usize,
    pub show_hidden: bool,
    pub mode: ViewMode,
    pub input_mode: InputMode,
    prompt: Option<String>,
    status: Option<String>,
    query: String,
    results: Vec<NodeId>,
    result_index: Option<usize>,
}

impl ViewState {
    pub fn new(show_hidden: bool) -> Self {
        Self {
            show_hidden,
            ..Self::default()
        }
    }

    /// Keep `cursor_index` inside a window of `height` rows over `total`
    /// rows, never scrolling past the last full page.
    pub fn adjust_scroll(&mut self, cursor_index: usize, height: usize, total: usize) {
        if height == 0 {
            self.scroll_offset = 0;
            return;
        }
        if cursor_index < self.scroll_offset {
            self.scroll_offset = cursor_index;
        }
        if cursor_index >= self.scroll_offset + height {
            self.scroll_offset = cursor_index + 1 - height;
        }
        let max_scroll = total.saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }

    pub fn toggle_hidden(&mut self) -> bool {
        self.show_hidden = !self.show_hidden;
        self.show_hidden
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.input_mode != InputMode::Normal || self.mode == ViewMode::Search
    }

    // ── Prompt / status ──────────────────────────────────────────────────

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = Some(prompt.into());
    }

    pub fn clear_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ── Search ───────────────────────────────────────────────────────────

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn results(&self) -> &[NodeId] {
        &self.results
    }

    /// Replace the result list and point at its first entry.
    pub fn set_results(&mut self, results: Vec<NodeId>) {
        self.result_index = if results.is_empty() { None } else { Some(0) };
        self.results = results;
    }

    pub fn current_result(&self) -> Option<NodeId> {
        self.result_index.and_then(|i| self.results.get(i).copied())
    }

    /// Advance to the next result, wrapping around.
    pub fn next_result(&mut self) -> Option<NodeId> {
        let len = self.results.len();
        if len == 0 {
            return None;
        }
        let next = self.result_index.map_or(0, |i| (i + 1) % len);
        self.result_index = Some(next);
        self.current_result()
    }

    /// Step back to the previous result, wrapping around.
    pub fn prev_result(&mut self) -> Option<NodeId> {
        let len = self.results.len();
        if len == 0 {
            return None;
        }
        let prev = self.result_index.map_or(len - 1, |i| (i + len - 1) % len);
        self.result_index = Some(prev);
        self.current_result()
    }

    /// 1-based position of the current result, for display.
    pub fn result_position(&self) -> Option<(usize, usize)> {
        self.result_index.map(|i| (i + 1, self.results.len()))
    }

    pub fn retain_results(&mut self, is_live: impl Fn(NodeId) -> bool) {
        let current = self.current_result();
        self.results.retain(|id| is_live(*id));
        self.result_index = match current {
            Some(id) => self
                .results
                .iter()
                .position(|r| *r == id)
                .or(if self.results.is_empty() { None } else { Some(0) }),
            None => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_follows_cursor_down() {
        let mut view = ViewState::default();
        view.adjust_scroll(12, 10, 30);
        assert_eq!(view.scroll_offset, 3);
        view.adjust_scroll(12, 10, 30);
        assert_eq!(view.scroll_offset, 3);
    }

    #[test]
    fn scroll_follows_cursor_up() {
        let mut view = ViewState::default();
        view.scroll_offset = 8;
        view.adjust_scroll(5, 10, 30);
        assert_eq!(view.scroll_offset, 5);
    }

    #[test]
    fn scroll_clamps_to_last_page() {
        let mut view = ViewState::default();
        view.scroll_offset = 25;
        view.adjust_scroll(27, 10, 30);
        assert_eq!(view.scroll_offset, 20);

        // Content shorter than the window never scrolls.
        view.adjust_scroll(3, 10, 5);
        assert_eq!(view.scroll_offset, 0);
    }

    #[test]
    fn zero_height_resets_scroll() {
        let mut view = ViewState::default();
        view.scroll_offset = 4;
        view.adjust_scroll(4, 0, 10);
        assert_eq!(view.scroll_offset, 0);
    }

    #[test]
    fn results_cycle_both_ways() {
        let mut view = ViewState::default();
        view.set_results(vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(view.current_result(), Some(NodeId(1)));
        assert_eq!(view.next_result(), Some(NodeId(2)));
        assert_eq!(view.next_result(), Some(NodeId(3)));
        assert_eq!(view.next_result(), Some(NodeId(1)));
        assert_eq!(view.prev_result(), Some(NodeId(3)));
        assert_eq!(view.result_position(), Some((3, 3)));
    }

    #[test]
    fn empty_results() {
        let mut view = ViewState::default();
        view.set_results(Vec::new());
        assert_eq!(view.current_result(), None);
        assert_eq!(view.next_result(), None);
        assert_eq!(view.prev_result(), None);
        assert_eq!(view.result_position(), None);
    }

    #[test]
    fn retain_results_keeps_current_when_possible() {
        let mut view = ViewState::default();
        view.set_results(vec![NodeId(1), NodeId(2), NodeId(3)]);
        view.next_result();
        view.next_result();
        view.retain_results(|id| id != NodeId(1));
        assert_eq!(view.current_result(), Some(NodeId(3)));

        view.retain_results(|id| id != NodeId(3));
        assert_eq!(view.current_result(), Some(NodeId(2)));

        view.retain_results(|_| false);
        assert_eq!(view.current_result(), None);
    }

    #[test]
    fn query_editing() {
        let mut view = ViewState::default();
        for c in "abc".chars() {
            view.push_query(c);
        }
        view.pop_query();
        assert_eq!(view.query(), "ab");
        view.clear_query();
        assert_eq!(view.query(), "");
    }

    #[test]
    fn waiting_for_input() {
        let mut view = ViewState::default();
        assert!(!view.is_waiting_for_input());
        view.input_mode = InputMode::WaitingForMark;
        assert!(view.is_waiting_for_input());
        view.input_mode = InputMode::Normal;
        view.mode = ViewMode::Search;
        assert!(view.is_waiting_for_input());
    }
}
