//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--show-hidden`, `--follow-symlinks`, `--log-level`)
//! 2. `--config FILE`
//! 3. `$TWF_CONFIG` environment variable (path to config file)
//! 4. Project-local `.twf.toml` in the current working directory
//! 5. Global `~/.config/twf/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Starting directory (overridden by CLI positional arg).
    pub default_path: Option<String>,
    /// Show hidden entries in search results and render them.
    pub show_hidden: Option<bool>,
    /// Stat symlinked children through the link.
    pub follow_symlinks: Option<bool>,
}

/// Tree view settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Columns of indentation per depth level.
    pub indent_width: Option<usize>,
    /// Prefix each row with its position in the visible list.
    pub show_line_numbers: Option<bool>,
    /// Unicode arrows for directory markers (false = ASCII `[+]`/`[-]`).
    pub use_icons: Option<bool>,
}

/// Cursor behavior.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CursorConfig {
    /// Navigation history length for Backspace.
    pub max_history: Option<usize>,
}

/// Color name overrides, one per UI role.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub cursor: Option<String>,
    pub selected: Option<String>,
    pub directory: Option<String>,
    pub file: Option<String>,
    pub hidden: Option<String>,
    pub status: Option<String>,
    pub status_count: Option<String>,
    pub prompt: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark" or "light".
    pub scheme: Option<String>,
    /// Per-role overrides applied on top of the scheme.
    pub custom: Option<ThemeColorsConfig>,
}

/// Log file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. "debug" or "twf=trace". "off" disables logging.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tree: TreeConfig,
    pub cursor: CursorConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default indentation per tree level.
pub const DEFAULT_INDENT_WIDTH: usize = 2;
/// Default navigation history length.
pub const DEFAULT_MAX_HISTORY: usize = 50;
/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("TWF_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".twf.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("twf").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
///
/// Runs before logging is set up, so warnings go to stderr.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl ThemeColorsConfig {
    fn merge(self, other: &ThemeColorsConfig) -> ThemeColorsConfig {
        ThemeColorsConfig {
            cursor: other.cursor.clone().or(self.cursor),
            selected: other.selected.clone().or(self.selected),
            directory: other.directory.clone().or(self.directory),
            file: other.file.clone().or(self.file),
            hidden: other.hidden.clone().or(self.hidden),
            status: other.status.clone().or(self.status),
            status_count: other.status_count.clone().or(self.status_count),
            prompt: other.prompt.clone().or(self.prompt),
        }
    }
}

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
                follow_symlinks: other
                    .general
                    .follow_symlinks
                    .or(self.general.follow_symlinks),
            },
            tree: TreeConfig {
                indent_width: other.tree.indent_width.or(self.tree.indent_width),
                show_line_numbers: other
                    .tree
                    .show_line_numbers
                    .or(self.tree.show_line_numbers),
                use_icons: other.tree.use_icons.or(self.tree.use_icons),
            },
            cursor: CursorConfig {
                max_history: other.cursor.max_history.or(self.cursor.max_history),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: match (self.theme.custom, &other.theme.custom) {
                    (Some(s), Some(o)) => Some(s.merge(o)),
                    (None, Some(o)) => Some(o.clone()),
                    (s, None) => s,
                },
            },
            log: LogConfig {
                level: other.log.level.clone().or(self.log.level),
                file: other.log.file.clone().or(self.log.file),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so that later files overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    pub fn follow_symlinks(&self) -> bool {
        self.general.follow_symlinks.unwrap_or(false)
    }

    /// Starting directory when none is given on the command line.
    pub fn default_path(&self) -> &str {
        self.general.default_path.as_deref().unwrap_or(".")
    }

    pub fn indent_width(&self) -> usize {
        self.tree.indent_width.unwrap_or(DEFAULT_INDENT_WIDTH)
    }

    pub fn show_line_numbers(&self) -> bool {
        self.tree.show_line_numbers.unwrap_or(false)
    }

    pub fn use_icons(&self) -> bool {
        self.tree.use_icons.unwrap_or(false)
    }

    /// History length, never below one.
    pub fn max_history(&self) -> usize {
        self.cursor.max_history.unwrap_or(DEFAULT_MAX_HISTORY).max(1)
    }

    /// Theme scheme: "dark" or "light".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log.file.as_ref().map(PathBuf::from)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
