use crate::app::App;
use crate::error::Result;
use crate::fs::{NodeId, TreeNode, Walker};
use crate::terminal::{Color, Device, Terminal};
use crate::theme::ThemeColors;
use crate::ui::{truncate, Rect};

/// Draw the visible slice of the tree into `area`, starting at the current
/// scroll offset.
pub fn render<D: Device>(app: &App, terminal: &mut Terminal<D>, area: Rect) -> Result<()> {
    let walker = Walker::new(&app.tree);
    let visible = walker.visible_nodes();
    let current = app.current_id();
    let gutter = if app.display.show_line_numbers {
        visible.len().to_string().len()
    } else {
        0
    };

    let rows = visible
        .iter()
        .enumerate()
        .skip(app.view.scroll_offset)
        .take(area.height as usize);
    for (offset, (index, node)) in rows.enumerate() {
        let mut text = String::new();
        if gutter > 0 {
            text.push_str(&format!("{:>gutter$} ", index + 1));
        }
        let depth = app.tree.depth(node.id);
        text.push_str(&" ".repeat(app.display.indent_width * depth));
        text.push_str(&node.display_name(!app.display.use_icons));

        let color = row_color(app, node, current);
        terminal.write_colored_at(
            area.row + offset as u16,
            area.col,
            &truncate(&text, area.width as usize),
            color,
        )?;
    }
    Ok(())
}

/// Selection beats cursor, cursor beats dimmed hidden entries, and the rest
/// are colored by kind.
fn row_color(app: &App, node: &TreeNode, current: Option<NodeId>) -> Color {
    let theme: &ThemeColors = &app.theme;
    if node.is_selected() {
        theme.selected
    } else if Some(node.id) == current {
        theme.cursor
    } else if node.is_hidden() && !app.view.show_hidden {
        theme.hidden
    } else if node.is_dir() {
        theme.directory
    } else {
        theme.file
    }
}
