//! Runtime settings resolved from the command line and the debug sentinel.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use tracing_subscriber::EnvFilter;

use crate::socket_ipc::socket_path;

/// Presence of this file turns on debug mode.
pub const DEBUG_SENTINEL: &str = "/tmp/.rofi-chrome-tab.debug";

pub const DEFAULT_LOG_PATH: &str = "/tmp/rofi-chrome-tab.log";

/// Filter used when `RUST_LOG` is unset or invalid. Dependencies stay at
/// their default level.
const DEFAULT_LOG_DIRECTIVE: &str = "rofi_chrome_tab=debug";

pub fn is_debug_mode() -> bool {
    Path::new(DEBUG_SENTINEL).exists()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pid: u32,
    pub debug: bool,
    pub socket_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve settings for this process. `--debug` forces debug mode,
    /// otherwise the sentinel file decides.
    pub fn resolve(
        force_debug: bool,
        socket: Option<PathBuf>,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self::with_debug(
            std::process::id(),
            force_debug || is_debug_mode(),
            socket,
            log_file,
        )
    }

    fn with_debug(
        pid: u32,
        debug: bool,
        socket: Option<PathBuf>,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self {
            pid,
            debug,
            socket_path: socket.unwrap_or_else(|| socket_path(pid, debug)),
            log_path: log_file.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
        }
    }
}

/// Install the log subscriber when debug mode is on. Without it every
/// `tracing` record is discarded. Stdout is never a log target because it
/// carries action frames.
pub fn init_logging(config: &Config) {
    if !config.debug {
        return;
    }

    let log_file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Failed to open log file {}: {e}",
                config.log_path.display()
            );
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!("Debug mode: logging to {}", config.log_path.display());
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_filter())
}

fn default_log_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_LOG_DIRECTIVE)
}
