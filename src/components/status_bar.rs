use std::time::{SystemTime, UNIX_EPOCH};

use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::error::Result;
use crate::fs::node::{FileMeta, NodeKind};
use crate::terminal::{Device, Terminal};
use crate::ui::{truncate, Rect};

/// Draw the status row: a pending prompt, else a status message, else the
/// cursor path (with size and mtime for files) and the selection count on
/// the right.
pub fn render<D: Device>(app: &App, terminal: &mut Terminal<D>, area: Rect) -> Result<()> {
    let width = area.width as usize;
    if width == 0 {
        return Ok(());
    }

    if let Some(prompt) = app.view.prompt() {
        return terminal.write_colored_at(area.row, area.col, &truncate(prompt, width), app.theme.prompt);
    }

    if let Some(message) = app.view.status() {
        let text = format!(" {message}");
        return terminal.write_colored_at(area.row, area.col, &truncate(&text, width), app.theme.message);
    }

    let Some(node) = app.current_node() else {
        return Ok(());
    };

    let count = app.selection.selected().len();
    let right = (count > 0).then(|| format!("Selected: {count}"));
    let right_width = right.as_deref().map_or(0, UnicodeWidthStr::width);

    let left = match node.kind {
        NodeKind::File => format!(" {}  {}", node.path.display(), file_info(&node.meta)),
        _ => format!(" {}", node.path.display()),
    };
    let left_room = if right_width > 0 {
        width.saturating_sub(right_width + 1)
    } else {
        width
    };
    terminal.write_colored_at(area.row, area.col, &truncate(&left, left_room), app.theme.status)?;

    if let Some(right) = right {
        if right_width <= width {
            let col = area.col + (width - right_width) as u16;
            terminal.write_colored_at(area.row, col, &right, app.theme.status_count)?;
        }
    }
    Ok(())
}

/// `"<size> | <YYYY-MM-DD HH:MM>"`, with the time in UTC.
fn file_info(meta: &FileMeta) -> String {
    let modified = meta
        .modified
        .map(format_modified)
        .unwrap_or_else(|| "Unknown".to_string());
    format!("{} | {}", format_size(meta.size), modified)
}

/// Format bytes into human-readable size string.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn format_modified(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let (year, month, day) = civil_date(secs / 86_400);
    let minutes = (secs % 86_400) / 60;
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        year,
        month,
        day,
        minutes / 60,
        minutes % 60
    )
}

/// Days since the Unix epoch to (year, month, day).
fn civil_date(days: u64) -> (u64, u64, u64) {
    let mut remaining = days;
    let mut year = 1970;
    loop {
        let year_len = if is_leap_year(year) { 366 } else { 365 };
        if remaining < year_len {
            break;
        }
        remaining -= year_len;
        year += 1;
    }

    let february = if is_leap_year(year) { 29 } else { 28 };
    let month_lens = [31, february, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 1;
    for len in month_lens {
        if remaining < len {
            break;
        }
        remaining -= len;
        month += 1;
    }
    (year, month, remaining + 1)
}

fn is_leap_year(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
