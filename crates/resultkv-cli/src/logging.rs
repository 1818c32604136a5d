//! Tracing setup for the CLI.
//!
//! Events go to `$XDG_STATE_HOME/resultkv/resultkv.log`. `main` falls back to
//! stderr when that file cannot be opened. `RUST_LOG` overrides the filter.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,resultkv=debug,resultkv_core=debug";
const LOG_FILE: &str = "resultkv.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Create `dir` if needed and open its log file for appending.
fn open_log_in(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("creating log dir {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    Ok((file, path))
}

/// Log to the XDG state file. Errors leave no subscriber installed.
pub fn init_logging() -> Result<()> {
    let state_dir = xdg::BaseDirectories::with_prefix("resultkv")?.get_state_home();
    let (file, path) = open_log_in(&state_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}

pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
