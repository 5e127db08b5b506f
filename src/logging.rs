//! File-based tracing setup.
//!
//! The UI owns the terminal while it runs, so log output goes to a file:
//! `[log] file` from config, else `<state dir>/twf/twf.log`.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "TWF_LOG";

/// Pick the filter directive: `$TWF_LOG`, else the configured level.
///
/// Returns `None` when logging is switched off.
pub fn resolve_filter(env_value: Option<&str>, config_level: &str) -> Option<String> {
    let directive = env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(config_level)
        .trim();
    if directive.is_empty() || directive.eq_ignore_ascii_case("off") {
        None
    } else {
        Some(directive.to_string())
    }
}

/// Default log file location.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("twf")
        .join("twf.log")
}

/// Build a subscriber writing to `log_file` filtered by `directive`.
///
/// An unparseable directive falls back to `info`.
pub fn build_subscriber(log_file: File, directive: &str) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}

/// Install the global subscriber. Returns the log file path on success.
///
/// Failures are reported on stderr and otherwise ignored: the browser runs
/// fine without a log.
pub fn init(config: &AppConfig) -> Option<PathBuf> {
    let env_value = std::env::var(LOG_ENV).ok();
    let directive = resolve_filter(env_value.as_deref(), config.log_level())?;
    let path = config.log_file().unwrap_or_else(default_log_path);

    let file = match open_log_file(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {}", path.display(), e);
            return None;
        }
    };

    if let Err(e) = tracing::subscriber::set_global_default(build_subscriber(file, &directive)) {
        eprintln!("Warning: failed to install logger: {e}");
        return None;
    }
    Some(path)
}
