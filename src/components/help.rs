use crate::error::Result;
use crate::terminal::{Device, Terminal};
use crate::theme::ThemeColors;
use crate::ui::{truncate, Rect};

/// A single keybinding entry for display.
struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

/// A category of keybindings.
struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const NAVIGATION_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "j / ↓",
        description: "Move down",
    },
    KeyEntry {
        key: "k / ↑",
        description: "Move up",
    },
    KeyEntry {
        key: "g / G",
        description: "Jump to first / last item",
    },
    KeyEntry {
        key: "l / → / Enter",
        description: "Expand directory",
    },
    KeyEntry {
        key: "h / ←",
        description: "Collapse directory or go to parent",
    },
    KeyEntry {
        key: "H",
        description: "Collapse directory and everything below",
    },
    KeyEntry {
        key: "Tab",
        description: "Toggle expand / collapse",
    },
    KeyEntry {
        key: "Backspace",
        description: "Go back to previous jump",
    },
    KeyEntry {
        key: "r",
        description: "Refresh directory",
    },
];

const SELECTION_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "Space",
        description: "Toggle multi-select",
    },
    KeyEntry {
        key: "u",
        description: "Clear selection",
    },
    KeyEntry {
        key: "*",
        description: "Select all search matches",
    },
    KeyEntry {
        key: "m<c>",
        description: "Set mark <c>",
    },
    KeyEntry {
        key: "'<c>",
        description: "Jump to mark <c>",
    },
    KeyEntry {
        key: "M",
        description: "Clear all marks",
    },
];

const SEARCH_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "/",
        description: "Search (ext:rs, *.txt, or name)",
    },
    KeyEntry {
        key: "n / N",
        description: "Next / previous match",
    },
    KeyEntry {
        key: ".",
        description: "Toggle hidden files",
    },
];

const GENERAL_KEYS: &[KeyEntry] = &[
    KeyEntry {
        key: "?",
        description: "Show this help",
    },
    KeyEntry {
        key: "Esc",
        description: "Cancel prompt, or quit",
    },
    KeyEntry {
        key: "q / Ctrl+C",
        description: "Quit",
    },
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Navigation",
        entries: NAVIGATION_KEYS,
    },
    KeyCategory {
        name: "Selection & Marks",
        entries: SELECTION_KEYS,
    },
    KeyCategory {
        name: "Search",
        entries: SEARCH_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Column width for the key column.
const KEY_COLUMN: usize = 16;

/// Build the help text, one line per entry, with a heading per category.
/// Headings are flagged `true`.
fn content_lines() -> Vec<(String, bool)> {
    let mut lines = vec![(" Keys (press any key to close)".to_string(), true)];
    for category in CATEGORIES {
        lines.push((String::new(), false));
        lines.push((format!(" {}", category.name), true));
        for entry in category.entries {
            let pad = KEY_COLUMN.saturating_sub(entry.key.chars().count());
            lines.push((
                format!("   {}{}{}", entry.key, " ".repeat(pad), entry.description),
                false,
            ));
        }
    }
    lines
}

/// Render the key table into `area`. Lines past the bottom are cut.
pub fn render<D: Device>(terminal: &mut Terminal<D>, area: Rect, theme: &ThemeColors) -> Result<()> {
    let width = area.width as usize;
    for (offset, (line, heading)) in content_lines()
        .into_iter()
        .take(area.height as usize)
        .enumerate()
    {
        if line.is_empty() {
            continue;
        }
        let color = if heading { theme.prompt } else { theme.file };
        terminal.write_colored_at(area.row + offset as u16, area.col, &truncate(&line, width), color)?;
    }
    Ok(())
}
