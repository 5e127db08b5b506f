use tracing::trace;

use crate::app::App;
use crate::error::Result;
use crate::state::{InputMode, ViewMode};
use crate::terminal::event::Key;

/// Handle a key event.
///
/// The help view swallows the key that closes it, the search prompt and
/// pending mark/jump commands take the key next, and everything else goes
/// through the normal bindings.
pub fn handle_key_event(app: &mut App, key: Key) -> Result<()> {
    trace!(?key, mode = ?app.view.mode, input = ?app.view.input_mode, "key");
    app.view.clear_status();

    match app.view.mode {
        ViewMode::Help => {
            app.close_help();
            return Ok(());
        }
        ViewMode::Search => return handle_search_key(app, key),
        ViewMode::Normal => {}
    }

    if app.view.is_waiting_for_input() {
        return handle_pending_key(app, key);
    }

    match key {
        Key::Char('q') | Key::Esc | Key::CtrlC | Key::CtrlD => app.quit(),

        Key::Char('j') | Key::Down => app.select_next()?,
        Key::Char('k') | Key::Up => app.select_previous()?,
        Key::Char('g') => app.select_first()?,
        Key::Char('G') => app.select_last()?,

        Key::Char('l') | Key::Right | Key::Enter => app.expand_current()?,
        Key::Char('h') | Key::Left => app.collapse_or_parent()?,
        Key::Char('H') => app.collapse_recursive()?,
        Key::Tab => app.toggle_expand()?,
        Key::Char('r') => app.refresh_current()?,

        Key::Char(' ') => app.toggle_selection()?,
        Key::Char('u') => app.clear_selection()?,
        Key::Char('*') => app.select_search_matches()?,
        Key::Char('m') => app.begin_mark(),
        Key::Char('\'') => app.begin_jump(),
        Key::Char('M') => app.clear_marks(),
        Key::Backspace => app.go_back()?,

        Key::Char('.') => app.toggle_hidden(),
        Key::Char('/') => app.begin_search(),
        Key::Char('n') => app.next_match()?,
        Key::Char('N') => app.prev_match()?,
        Key::Char('?') => app.show_help(),

        _ => {}
    }
    Ok(())
}

/// Complete a pending `m` or `'` with the mark character; any other key
/// cancels it.
fn handle_pending_key(app: &mut App, key: Key) -> Result<()> {
    match (app.view.input_mode, key) {
        (InputMode::WaitingForMark, Key::Char(c)) => app.set_mark(c),
        (InputMode::WaitingForJump, Key::Char(c)) => app.jump_to_mark(c)?,
        _ => app.cancel_input(),
    }
    Ok(())
}

fn handle_search_key(app: &mut App, key: Key) -> Result<()> {
    match key {
        Key::Enter => app.submit_search()?,
        Key::Esc | Key::CtrlC => app.cancel_input(),
        Key::CtrlD => app.quit(),
        Key::Backspace => app.search_backspace(),
        Key::Char(c) if !c.is_control() => app.search_input(c),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("docs/guide.md"), "").unwrap();
        fs::write(root.join("main.rs"), "").unwrap();
        let app = App::new(&root, &AppConfig::default()).unwrap();
        (dir, app)
    }

    fn press(app: &mut App, keys: &[Key]) {
        for key in keys {
            handle_key_event(app, *key).unwrap();
        }
    }

    #[test]
    fn quit_keys() {
        for key in [Key::Char('q'), Key::Esc, Key::CtrlC, Key::CtrlD] {
            let (_dir, mut app) = setup_test_app();
            press(&mut app, &[key]);
            assert!(app.should_quit, "{key:?} should quit");
        }
    }

    #[test]
    fn movement_keys() {
        let (_dir, mut app) = setup_test_app();
        let root = app.tree.root_id();
        press(&mut app, &[Key::Char('j')]);
        assert_ne!(app.current_id(), root);
        press(&mut app, &[Key::Up]);
        assert_eq!(app.current_id(), root);
        press(&mut app, &[Key::Down, Key::Char('k')]);
        assert_eq!(app.current_id(), root);
    }

    #[test]
    fn esc_cancels_mark_prompt_instead_of_quitting() {
        let (_dir, mut app) = setup_test_app();
        press(&mut app, &[Key::Char('m')]);
        assert_eq!(app.view.input_mode, InputMode::WaitingForMark);
        press(&mut app, &[Key::Esc]);
        assert!(!app.should_quit);
        assert_eq!(app.view.input_mode, InputMode::Normal);
        assert_eq!(app.view.prompt(), None);
    }

    #[test]
    fn mark_then_jump() {
        let (_dir, mut app) = setup_test_app();
        let root = app.tree.root_id().unwrap();
        let docs = app.tree.child_by_name(root, "docs").unwrap();
        app.tree.expand_node(docs).unwrap();
        let guide = app.tree.child_by_name(docs, "guide.md").unwrap();
        while app.current_id() != Some(guide) {
            press(&mut app, &[Key::Char('j')]);
        }

        press(&mut app, &[Key::Char('m'), Key::Char('x')]);
        press(&mut app, &[Key::Char('g')]);
        assert_eq!(app.current_id(), Some(root));
        press(&mut app, &[Key::Char('\''), Key::Char('x')]);
        assert_eq!(app.current_id(), Some(guide));

        // Mark letters are not interpreted as commands.
        press(&mut app, &[Key::Char('m'), Key::Char('q')]);
        assert!(!app.should_quit);
    }

    #[test]
    fn clear_marks_key_forgets_every_mark() {
        let (_dir, mut app) = setup_test_app();
        press(&mut app, &[Key::Char('m'), Key::Char('a')]);
        press(&mut app, &[Key::Char('j'), Key::Char('m'), Key::Char('b')]);
        press(&mut app, &[Key::Char('M')]);
        assert_eq!(app.view.status(), Some("Cleared 2 marks"));

        press(&mut app, &[Key::Char('\''), Key::Char('a')]);
        assert_eq!(app.view.status(), Some("Mark 'a' not set"));
    }

    #[test]
    fn search_prompt_captures_keys() {
        let (_dir, mut app) = setup_test_app();
        press(&mut app, &[Key::Char('/')]);
        assert_eq!(app.view.mode, ViewMode::Search);
        // 'q' and 'j' are query text here.
        press(
            &mut app,
            &[Key::Char('m'), Key::Char('a'), Key::Char('q'), Key::Backspace],
        );
        assert!(!app.should_quit);
        assert_eq!(app.view.query(), "ma");
        press(&mut app, &[Key::Enter]);
        assert_eq!(app.current_node().unwrap().name, "main.rs");
    }

    #[test]
    fn search_escape_returns_to_normal() {
        let (_dir, mut app) = setup_test_app();
        press(&mut app, &[Key::Char('/'), Key::Char('z'), Key::Esc]);
        assert_eq!(app.view.mode, ViewMode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn help_closes_on_any_key() {
        let (_dir, mut app) = setup_test_app();
        press(&mut app, &[Key::Char('?')]);
        assert_eq!(app.view.mode, ViewMode::Help);
        press(&mut app, &[Key::Char('q')]);
        assert_eq!(app.view.mode, ViewMode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn status_is_cleared_by_next_key() {
        let (_dir, mut app) = setup_test_app();
        press(&mut app, &[Key::Char('.')]);
        assert!(app.view.status().is_some());
        press(&mut app, &[Key::Char('j')]);
        assert!(app.view.status().is_none());
    }

    #[test]
    fn expand_collapse_and_selection_keys() {
        let (_dir, mut app) = setup_test_app();
        let root = app.tree.root_id().unwrap();
        let docs = app.tree.child_by_name(root, "docs").unwrap();
        while app.current_id() != Some(docs) {
            press(&mut app, &[Key::Char('j')]);
        }
        press(&mut app, &[Key::Enter]);
        assert!(app.tree.node(docs).unwrap().is_expanded());
        press(&mut app, &[Key::Tab]);
        assert!(!app.tree.node(docs).unwrap().is_expanded());
        press(&mut app, &[Key::Right, Key::Left]);
        assert!(!app.tree.node(docs).unwrap().is_expanded());

        press(&mut app, &[Key::Char(' ')]);
        assert_eq!(app.selection.selected().len(), 1);
        press(&mut app, &[Key::Char('u')]);
        assert_eq!(app.selection.selected().len(), 0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (_dir, mut app) = setup_test_app();
        let before = app.current_id();
        press(&mut app, &[Key::Unknown, Key::Char('Z')]);
        assert_eq!(app.current_id(), before);
        assert!(!app.should_quit);
    }
}
