//! Theme data model: built-in palettes and resolution from config.
//!
//! Two palettes (dark and light) over the eight basic ANSI colors, with
//! per-role overrides from `[theme.custom]`.

use crate::config::{AppConfig, ThemeColorsConfig};
use crate::terminal::Color;

// ── Runtime theme colors ─────────────────────────────────────────────────────

/// All runtime colors used in the UI.
///
/// Constructed from the loaded `AppConfig` via `resolve_theme()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    // Tree view
    pub cursor: Color,
    pub selected: Color,
    pub directory: Color,
    pub file: Color,
    pub hidden: Color,

    // Status row
    pub status: Color,
    pub status_count: Color,
    pub prompt: Color,

    // Not configurable
    pub message: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        dark_theme()
    }
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Palette for dark terminal backgrounds.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        cursor: Color::Yellow,
        selected: Color::Green,
        directory: Color::Blue,
        file: Color::White,
        hidden: Color::Magenta,
        status: Color::Cyan,
        status_count: Color::Yellow,
        prompt: Color::Blue,
        message: Color::Red,
    }
}

/// Palette for light terminal backgrounds.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        cursor: Color::Red,
        selected: Color::Green,
        directory: Color::Blue,
        file: Color::Black,
        hidden: Color::Cyan,
        status: Color::Blue,
        status_count: Color::Magenta,
        prompt: Color::Blue,
        message: Color::Red,
    }
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ThemeColors` from config.
///
/// - `"dark"` (default) and any unrecognized value: dark palette
/// - `"light"`: light palette
///
/// Custom color names are then applied on top; unknown names are ignored.
pub fn resolve_theme(config: &AppConfig) -> ThemeColors {
    let mut theme = match config.theme_scheme() {
        "light" => light_theme(),
        _ => dark_theme(),
    };
    if let Some(custom) = &config.theme.custom {
        apply_custom_colors(&mut theme, custom);
    }
    theme
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    let overrides = [
        (&custom.cursor, &mut theme.cursor),
        (&custom.selected, &mut theme.selected),
        (&custom.directory, &mut theme.directory),
        (&custom.file, &mut theme.file),
        (&custom.hidden, &mut theme.hidden),
        (&custom.status, &mut theme.status),
        (&custom.status_count, &mut theme.status_count),
        (&custom.prompt, &mut theme.prompt),
    ];
    for (name, slot) in overrides {
        if let Some(color) = name.as_deref().and_then(Color::from_name) {
            *slot = color;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
