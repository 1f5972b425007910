use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::infra::config::DEFAULT_CONFIG_FILE;

/// Default log file, appended to on every run
pub const DEFAULT_LOG_FILE: &str = "mailtidy.log";

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // --quiet
    pub no_color: bool, // --no-color
    pub dry_run: bool,  // --dry-run
    pub json: bool,     // --json
}

#[derive(Parser, Debug)]
#[command(name = "mailtidy")]
#[command(
    about = "Normalize quoted email text: strip '>' markers, break on spaces and '。', separate keyword lines"
)]
#[command(version, long_about = None)]
#[command(after_help = "Examples:\n  \
    mailtidy                      run with ./config.ini (created if missing)\n  \
    mailtidy --config my.ini      use another configuration file\n  \
    mailtidy --log-level DEBUG    verbose logging")]
pub struct Cli {
    /// Configuration file (created with defaults if it does not exist)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log level for console and log file
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log file (appended)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Transform and report without writing outputs or backups
    #[arg(long)]
    pub dry_run: bool,

    /// Delete successfully processed originals from the input directory
    #[arg(long)]
    pub delete_originals: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress the summary line on stdout
    #[arg(long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            dry_run: self.dry_run,
            json: self.json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING", alias = "WARN")]
    Warning,
    #[value(name = "ERROR")]
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}
