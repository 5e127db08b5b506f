use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::components::{help, status_bar, tree};
use crate::error::Result;
use crate::fs::Walker;
use crate::state::ViewMode;
use crate::terminal::{Device, Terminal};

/// A screen rectangle in 1-based terminal coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub row: u16,
    pub col: u16,
    pub width: u16,
    pub height: u16,
}

/// Main area on top, one status row at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub main: Rect,
    pub status: Rect,
}

impl Layout {
    pub fn split(cols: u16, rows: u16) -> Layout {
        Layout {
            main: Rect {
                row: 1,
                col: 1,
                width: cols,
                height: rows.saturating_sub(1),
            },
            status: Rect {
                row: rows.max(1),
                col: 1,
                width: cols,
                height: rows.min(1),
            },
        }
    }
}

/// Render the application UI as one frame.
pub fn render<D: Device>(app: &mut App, terminal: &mut Terminal<D>) -> Result<()> {
    let (cols, rows) = terminal.size()?;
    let layout = Layout::split(cols, rows);

    // Keep the cursor row inside the tree window
    if let Some(current) = app.current_id() {
        let walker = Walker::new(&app.tree);
        let index = walker.visible_index(current).unwrap_or(0);
        let total = walker.visible_nodes().len();
        app.view
            .adjust_scroll(index, layout.main.height as usize, total);
    }

    terminal.clear_screen()?;
    terminal.move_cursor_home()?;
    if layout.main.height > 0 {
        match app.view.mode {
            ViewMode::Help => help::render(terminal, layout.main, &app.theme)?,
            ViewMode::Normal | ViewMode::Search => tree::render(app, terminal, layout.main)?,
        }
    }
    if layout.status.height > 0 {
        status_bar::render(app, terminal, layout.status)?;
    }
    terminal.flush()
}

/// Cut `text` to at most `width` terminal columns.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::terminal::mock::MockDevice;
    use std::fs;
    use tempfile::TempDir;

    fn setup(cols: u16, rows: u16) -> (TempDir, App, Terminal<MockDevice>, MockDevice) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        for i in 0..30 {
            fs::write(root.join(format!("file{i:02}.txt")), "").unwrap();
        }
        let app = App::new(&root, &AppConfig::default()).unwrap();
        let device = MockDevice::new(cols, rows);
        (dir, app, Terminal::new(device.clone()), device)
    }

    fn screen(device: &MockDevice, cols: u16, rows: u16) -> vt100::Parser {
        let mut parser = vt100::Parser::new(rows, cols, 0);
        parser.process(&device.output());
        parser
    }

    #[test]
    fn layout_split() {
        let layout = Layout::split(80, 24);
        assert_eq!(layout.main.height, 23);
        assert_eq!(layout.status.row, 24);
        let tiny = Layout::split(10, 1);
        assert_eq!(tiny.main.height, 0);
        assert_eq!(tiny.status.row, 1);
        let none = Layout::split(10, 0);
        assert_eq!(none.status.height, 0);
    }

    #[test]
    fn truncate_respects_wide_chars() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("日本語", 5), "日本");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn frame_has_root_and_status_path() {
        let (_dir, mut app, mut term, device) = setup(60, 10);
        render(&mut app, &mut term).unwrap();
        let parser = screen(&device, 60, 10);
        let contents = parser.screen().contents();
        let first_line = contents.lines().next().unwrap();
        assert_eq!(first_line.trim_end(), "[-] proj");
        let root_path = app.tree.root().unwrap().path.display().to_string();
        let status_row = contents.lines().nth(9).unwrap_or_default();
        assert!(status_row.contains(&root_path), "status row: {status_row:?}");
    }

    #[test]
    fn scroll_keeps_cursor_on_screen() {
        let (_dir, mut app, mut term, device) = setup(40, 8);
        for _ in 0..20 {
            app.select_next().unwrap();
        }
        render(&mut app, &mut term).unwrap();
        let expected = app.current_node().unwrap().name.clone();
        assert!(app.view.scroll_offset > 0);

        let parser = screen(&device, 40, 8);
        let contents = parser.screen().contents();
        assert!(contents.contains(&expected));
        assert!(!contents.contains("[-] proj"), "root scrolled away");
    }

    #[test]
    fn help_view_replaces_tree() {
        let (_dir, mut app, mut term, device) = setup(60, 30);
        app.show_help();
        render(&mut app, &mut term).unwrap();
        let contents = screen(&device, 60, 30).screen().contents();
        assert!(contents.contains("Keys"));
        assert!(!contents.contains("file00.txt"));
    }

    #[test]
    fn each_frame_starts_with_clear() {
        let (_dir, mut app, mut term, device) = setup(40, 5);
        render(&mut app, &mut term).unwrap();
        assert!(device.output_string().starts_with("\x1b[2J\x1b[H"));
    }

    #[test]
    fn layout_follows_resize() {
        let (_dir, mut app, mut term, device) = setup(40, 10);
        render(&mut app, &mut term).unwrap();
        device.resize(40, 4);
        device.clear_output();
        render(&mut app, &mut term).unwrap();
        let contents = screen(&device, 40, 4).screen().contents();
        let root_path = app.tree.root().unwrap().path.display().to_string();
        let status_row = contents.lines().nth(3).unwrap_or_default();
        assert!(root_path.starts_with(status_row.trim()), "status row: {status_row:?}");
        assert_eq!(contents.lines().count(), 4);
    }
}
