mod app;
mod components;
mod config;
mod error;
mod fs;
mod handler;
mod logging;
mod state;
mod terminal;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;

use clap::Parser;

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, LogConfig};
use crate::tui::{install_panic_hook, Tui};

/// A tree-style file browser for the terminal.
#[derive(Parser, Debug)]
#[command(name = "twf", version, about)]
struct Cli {
    /// Directory to browse (defaults to the configured path, then ".")
    path: Option<PathBuf>,

    /// Config file to use instead of the default locations
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Show hidden files at startup
    #[arg(long, short = 'a')]
    show_hidden: bool,

    /// Follow symbolic links to directories
    #[arg(long, short = 'L')]
    follow_symlinks: bool,

    /// Log level or filter directive (e.g. "debug", "twf=trace", "off")
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Flags only override the config when they were given.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                show_hidden: self.show_hidden.then_some(true),
                follow_symlinks: self.follow_symlinks.then_some(true),
                ..GeneralConfig::default()
            },
            log: LogConfig {
                level: self.log_level.clone(),
                ..LogConfig::default()
            },
            ..AppConfig::default()
        }
    }
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    let log_path = logging::init(&config);

    let requested = cli
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.default_path()));
    let path = requested.canonicalize().map_err(|e| {
        error::AppError::InvalidPath(format!("{}: {}", requested.display(), e))
    })?;
    tracing::info!(path = %path.display(), log = ?log_path, "starting");

    install_panic_hook();

    let mut app = App::new(&path, &config)?;
    let mut tui = Tui::open()?;
    tui.run_to_completion(&mut app)
}
