//! Logging setup: one console layer (stderr) and one file layer, both
//! filtered at the level chosen on the command line.
//!
//! The subscriber is installed as the default for the current thread only and
//! stays active while the returned guard is alive.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::subscriber::DefaultGuard;
use tracing::{debug, trace};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{filter::LevelFilter, fmt};

use crate::cli::LogLevel;

/// `2025-01-31 09:15:02` style local timestamps
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install console + file logging; keep the guard for the whole run.
pub fn init_logging(level: LogLevel, log_file: &Path, ansi: bool) -> Result<DefaultGuard> {
    if let Some(parent) = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("open log file {}", log_file.display()))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::from(level))
        .with(console_layer)
        .with(file_layer);

    let guard = tracing::subscriber::set_default(subscriber);

    debug!("logging to {} at {:?}", log_file.display(), level);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    Ok(guard)
}
