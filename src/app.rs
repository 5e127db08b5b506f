use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::fs::{FileTree, LoadOptions, NodeId, TreeNode, Walker};
use crate::state::{CursorState, InputMode, SelectionState, ViewMode, ViewState};
use crate::theme::{resolve_theme, ThemeColors};

pub const MARK_PROMPT: &str = " Mark: _";
pub const JUMP_PROMPT: &str = " Jump to: _";

/// Tree rendering options taken from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub indent_width: usize,
    pub show_line_numbers: bool,
    pub use_icons: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            indent_width: crate::config::DEFAULT_INDENT_WIDTH,
            show_line_numbers: false,
            use_icons: false,
        }
    }
}

/// How a search query string is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// `ext:rs`
    Extension(String),
    /// Contains `*`, `?` or `[`.
    Pattern(String),
    /// Case-insensitive substring.
    Name(String),
}

impl SearchQuery {
    pub fn parse(query: &str) -> SearchQuery {
        if let Some(ext) = query.strip_prefix("ext:") {
            SearchQuery::Extension(ext.to_string())
        } else if query.contains(['*', '?', '[']) {
            SearchQuery::Pattern(query.to_string())
        } else {
            SearchQuery::Name(query.to_string())
        }
    }

    pub fn run<'a>(&self, walker: &Walker<'a>) -> Vec<&'a TreeNode> {
        match self {
            SearchQuery::Extension(ext) => walker.find_by_extension(ext),
            SearchQuery::Pattern(pattern) => walker.find_by_pattern(pattern),
            SearchQuery::Name(name) => walker.find_by_name(name),
        }
    }
}

/// Main application state.
pub struct App {
    pub tree: FileTree,
    pub cursor: CursorState,
    pub selection: SelectionState,
    pub view: ViewState,
    pub display: DisplayOptions,
    pub theme: ThemeColors,
    pub should_quit: bool,
}

impl App {
    /// Load `path` as the root, open it, and put the cursor on it.
    pub fn new(path: &Path, config: &AppConfig) -> Result<Self> {
        let mut tree = FileTree::with_options(LoadOptions {
            follow_symlinks: config.follow_symlinks(),
        });
        let root = tree.load_root(path)?;

        let mut app = Self {
            tree,
            cursor: CursorState::new(config.max_history()),
            selection: SelectionState::new(),
            view: ViewState::new(config.show_hidden()),
            display: DisplayOptions {
                indent_width: config.indent_width(),
                show_line_numbers: config.show_line_numbers(),
                use_icons: config.use_icons(),
            },
            theme: resolve_theme(config),
            should_quit: false,
        };
        app.cursor.set(root);

        match app.tree.expand_node(root) {
            Ok(()) | Err(AppError::NotExpandable(_)) => {}
            Err(e) if e.is_recoverable() => {
                warn!("cannot open root: {e}");
                app.view.set_status(e.to_string());
            }
            Err(e) => return Err(e),
        }
        info!(root = %path.display(), nodes = app.walker().collect_all().len(), "tree loaded");
        Ok(app)
    }

    pub fn walker(&self) -> Walker<'_> {
        Walker::new(&self.tree)
    }

    /// The cursor node, falling back to the root if the cursor went stale.
    pub fn current_node(&self) -> Option<&TreeNode> {
        self.tree.current_node().or_else(|| self.tree.root())
    }

    pub fn current_id(&self) -> Option<NodeId> {
        self.tree
            .current_id()
            .filter(|id| self.tree.contains(*id))
            .or_else(|| self.tree.root_id())
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Cursor movement ──────────────────────────────────────────────────

    /// Step the cursor without recording history.
    fn step_to(&mut self, id: NodeId) -> Result<()> {
        self.tree.set_current_node(id)?;
        self.cursor.set(id);
        Ok(())
    }

    /// Jump the cursor, recording the old position in history.
    fn jump_to(&mut self, id: NodeId) -> Result<()> {
        self.reveal(id)?;
        self.tree.set_current_node(id)?;
        self.cursor.move_to(id);
        Ok(())
    }

    /// Expand every ancestor of `id` so that it is visible.
    fn reveal(&mut self, id: NodeId) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(AppError::UnknownNode(id));
        }
        let mut ancestors = self.tree.ancestors(id);
        ancestors.pop();
        for ancestor in ancestors {
            self.tree.expand_node(ancestor)?;
        }
        Ok(())
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) -> Result<()> {
        let Some(current) = self.current_id() else {
            return Ok(());
        };
        match self.walker().next_visible(current).map(|n| n.id) {
            Some(next) => self.step_to(next),
            None => Ok(()),
        }
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) -> Result<()> {
        let Some(current) = self.current_id() else {
            return Ok(());
        };
        match self.walker().prev_visible(current).map(|n| n.id) {
            Some(prev) => self.step_to(prev),
            None => Ok(()),
        }
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) -> Result<()> {
        match self.tree.root_id() {
            Some(root) => self.jump_to(root),
            None => Ok(()),
        }
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) -> Result<()> {
        match self.walker().visible_nodes().last().map(|n| n.id) {
            Some(last) => self.jump_to(last),
            None => Ok(()),
        }
    }

    // ── Expand / collapse ────────────────────────────────────────────────

    /// Open the cursor directory. Does nothing on files.
    pub fn expand_current(&mut self) -> Result<()> {
        let Some(node) = self.current_node() else {
            return Ok(());
        };
        if !node.can_expand() {
            return Ok(());
        }
        let id = node.id;
        self.tree.expand_node(id)
    }

    /// Close the cursor directory if open, otherwise move to its parent.
    pub fn collapse_or_parent(&mut self) -> Result<()> {
        let Some(node) = self.current_node() else {
            return Ok(());
        };
        let (id, parent) = (node.id, node.parent());
        if node.is_dir() && node.is_expanded() {
            self.tree.collapse_node(id)
        } else if let Some(parent) = parent {
            self.step_to(parent)
        } else {
            Ok(())
        }
    }

    /// Close the cursor directory (or the file's parent) and every loaded
    /// directory below it.
    pub fn collapse_recursive(&mut self) -> Result<()> {
        let Some(node) = self.current_node() else {
            return Ok(());
        };
        let target = if node.is_dir() {
            node.id
        } else {
            match node.parent() {
                Some(parent) => parent,
                None => return Ok(()),
            }
        };

        let mut open = Vec::new();
        self.walker().walk_from(target, |n| {
            if n.is_dir() && n.is_expanded() {
                open.push(n.id);
            }
            Ok(())
        })?;
        debug!(count = open.len(), "collapsing subtree");
        for id in open {
            self.tree.collapse_node(id)?;
        }
        self.step_to(target)
    }

    /// Tab: flip the cursor directory between open and closed.
    pub fn toggle_expand(&mut self) -> Result<()> {
        let Some(node) = self.current_node() else {
            return Ok(());
        };
        if !node.can_expand() {
            return Ok(());
        }
        let id = node.id;
        if node.is_expanded() {
            self.tree.collapse_node(id)
        } else {
            self.tree.expand_node(id)
        }
    }

    /// Re-read the cursor directory, or the directory holding the cursor file.
    pub fn refresh_current(&mut self) -> Result<()> {
        let Some(node) = self.current_node() else {
            return Ok(());
        };
        let target = if node.is_dir() {
            node.id
        } else {
            node.parent().unwrap_or(node.id)
        };

        let result = self.tree.refresh_node(target);
        self.prune_stale(target)?;
        result?;

        if let Some(node) = self.tree.node(target) {
            let message = format!("Refreshed {}", node.name);
            debug!("{message}");
            self.view.set_status(message);
        }
        Ok(())
    }

    /// Drop references to nodes discarded by a refresh of `refreshed`.
    fn prune_stale(&mut self, refreshed: NodeId) -> Result<()> {
        let tree = &self.tree;
        self.selection.prune(|id| tree.contains(id));
        self.view.retain_results(|id| tree.contains(id));
        if self.cursor.current().is_some_and(|id| !tree.contains(id)) {
            self.step_to(refreshed)?;
        }
        Ok(())
    }

    // ── Selection & marks ────────────────────────────────────────────────

    pub fn toggle_selection(&mut self) -> Result<()> {
        let Some(id) = self.current_id() else {
            return Ok(());
        };
        let selected = self.selection.toggle(id);
        self.tree.set_selected(id, selected)
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        for id in self.selection.clear() {
            if self.tree.contains(id) {
                self.tree.set_selected(id, false)?;
            }
        }
        Ok(())
    }

    /// Add every node matched by the last search to the selection.
    pub fn select_search_matches(&mut self) -> Result<()> {
        let matches: HashSet<NodeId> = self.view.results().iter().copied().collect();
        if matches.is_empty() {
            self.view.set_status("No search results to select");
            return Ok(());
        }
        let ids: Vec<NodeId> = self
            .walker()
            .collect_where(|node| matches.contains(&node.id))
            .iter()
            .map(|node| node.id)
            .collect();

        let mut added = 0;
        for id in ids {
            if self.selection.select(id) {
                self.tree.set_selected(id, true)?;
                added += 1;
            }
        }
        self.view.set_status(format!("Selected {added} matches"));
        Ok(())
    }

    pub fn begin_mark(&mut self) {
        self.view.input_mode = InputMode::WaitingForMark;
        self.view.set_prompt(MARK_PROMPT);
    }

    pub fn begin_jump(&mut self) {
        self.view.input_mode = InputMode::WaitingForJump;
        self.view.set_prompt(JUMP_PROMPT);
    }

    pub fn set_mark(&mut self, mark: char) {
        self.finish_input();
        if let Some(id) = self.current_id() {
            self.selection.set_mark(mark, id);
            self.view.set_status(format!("Mark '{mark}' set"));
        }
    }

    pub fn jump_to_mark(&mut self, mark: char) -> Result<()> {
        self.finish_input();
        match self.selection.mark(mark) {
            Some(id) if self.tree.contains(id) => self.jump_to(id),
            Some(_) => {
                self.view.set_status(format!("Mark '{mark}' no longer exists"));
                Ok(())
            }
            None => {
                self.view.set_status(format!("Mark '{mark}' not set"));
                Ok(())
            }
        }
    }

    /// Return to the previous jump position.
    pub fn go_back(&mut self) -> Result<()> {
        if !self.cursor.can_go_back() {
            self.view.set_status("No history");
            return Ok(());
        }
        let tree = &self.tree;
        match self.cursor.go_back(|id| tree.contains(id)) {
            Some(id) => {
                self.reveal(id)?;
                self.tree.set_current_node(id)
            }
            None => {
                self.view.set_status("No history");
                Ok(())
            }
        }
    }

    pub fn clear_marks(&mut self) {
        let count = self.selection.mark_count();
        self.selection.clear_marks();
        self.view.set_status(format!("Cleared {count} marks"));
    }

    // ── View toggles ─────────────────────────────────────────────────────

    pub fn toggle_hidden(&mut self) {
        let shown = self.view.toggle_hidden();
        self.view.set_status(if shown {
            "Showing hidden files"
        } else {
            "Hiding hidden files"
        });
    }

    pub fn show_help(&mut self) {
        self.view.mode = ViewMode::Help;
    }

    pub fn close_help(&mut self) {
        self.view.mode = ViewMode::Normal;
    }

    /// Leave any pending prompt (mark, jump or search).
    pub fn cancel_input(&mut self) {
        if self.view.mode == ViewMode::Search {
            self.view.mode = ViewMode::Normal;
            self.view.clear_query();
        }
        self.finish_input();
    }

    fn finish_input(&mut self) {
        self.view.input_mode = InputMode::Normal;
        self.view.clear_prompt();
    }

    // ── Search ───────────────────────────────────────────────────────────

    pub fn begin_search(&mut self) {
        self.view.mode = ViewMode::Search;
        self.view.clear_query();
        self.update_search_prompt();
    }

    pub fn search_input(&mut self, c: char) {
        self.view.push_query(c);
        self.update_search_prompt();
    }

    pub fn search_backspace(&mut self) {
        self.view.pop_query();
        self.update_search_prompt();
    }

    fn update_search_prompt(&mut self) {
        let prompt = format!(" Search: {}_", self.view.query());
        self.view.set_prompt(prompt);
    }

    /// Run the typed query over every loaded node and jump to the first match.
    pub fn submit_search(&mut self) -> Result<()> {
        let query = self.view.query().to_string();
        self.view.mode = ViewMode::Normal;
        self.finish_input();
        if query.is_empty() {
            return Ok(());
        }

        let results = self.search(&query)?;
        debug!(query = %query, matches = results.len(), "search");
        self.view.set_results(results);
        match self.view.current_result() {
            Some(first) => {
                self.jump_to(first)?;
                self.report_match(&query);
            }
            None => self.view.set_status(format!("No matches for '{query}'")),
        }
        Ok(())
    }

    /// Ids of loaded nodes matching `query`. Unless hidden files are shown,
    /// dotfiles and everything below a dot-directory are dropped.
    pub fn search(&self, query: &str) -> Result<Vec<NodeId>> {
        let walker = self.walker();
        let matches = SearchQuery::parse(query).run(&walker);
        if self.view.show_hidden {
            return Ok(matches.iter().map(|node| node.id).collect());
        }

        let unhidden: HashSet<NodeId> = walker
            .filter_hidden(false)
            .iter()
            .map(|node| node.id)
            .collect();
        // Parents are visited before children. The root always counts as
        // shown, even when it is itself a dot-directory.
        let mut shown = HashSet::new();
        walker.walk(|node| {
            let keep = match node.parent() {
                None => true,
                Some(parent) => shown.contains(&parent) && unhidden.contains(&node.id),
            };
            if keep {
                shown.insert(node.id);
            }
            Ok(())
        })?;

        Ok(matches
            .iter()
            .map(|node| node.id)
            .filter(|id| shown.contains(id))
            .collect())
    }

    pub fn next_match(&mut self) -> Result<()> {
        match self.view.next_result() {
            Some(id) => {
                self.jump_to(id)?;
                let query = self.view.query().to_string();
                self.report_match(&query);
                Ok(())
            }
            None => {
                self.view.set_status("No search results");
                Ok(())
            }
        }
    }

    pub fn prev_match(&mut self) -> Result<()> {
        match self.view.prev_result() {
            Some(id) => {
                self.jump_to(id)?;
                let query = self.view.query().to_string();
                self.report_match(&query);
                Ok(())
            }
            None => {
                self.view.set_status("No search results");
                Ok(())
            }
        }
    }

    fn report_match(&mut self, query: &str) {
        if let Some((pos, total)) = self.view.result_position() {
            self.view.set_status(format!("Match {pos}/{total}: {query}"));
        }
    }
}
