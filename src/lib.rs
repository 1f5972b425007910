//! **mailtidy** - Normalizes quoted email text for reading and archiving
//!
//! Strips `>` quote markers, breaks lines on half/full-width spaces and after `。`,
//! and separates header-like keyword lines with a blank line. Runs over a directory
//! of `.txt` files with optional backups and per-file error reporting.

/// Command-line interface with clap integration
pub mod cli;

/// Core processing pipeline - text transformation and the per-file run loop
pub mod core {
    /// Line-by-line quote stripping, space/sentence breaking, keyword separation
    pub mod transform;
    pub use transform::{TextTransformer, transform};

    /// Sequential batch run with per-file outcomes and a run summary
    pub mod batch;
    pub use batch::{BatchRunner, RunOptions, RunSummary, run};

    /// Verified copies of originals into `<input_dir>/backup/`
    pub mod backup;
    pub use backup::BackupWriter;

    /// Error taxonomy: fatal startup errors vs recoverable per-file errors
    pub mod error;
}

/// Infrastructure - Configuration, I/O, discovery, and logging
pub mod infra {
    /// INI configuration with defaults written on first use
    pub mod config;
    pub use config::{Settings, load_config, load_or_create};

    /// Encoding-aware reading (memory-mapped above 1MB) and atomic writes
    pub mod io;
    pub use io::{Document, TextEncoding, read_document, write_output};

    /// Flat `*.txt` discovery in the input directory
    pub mod walk;
    pub use walk::FileWalker;

    /// Console + log file tracing setup
    pub mod logging;
}

// Strategic re-exports for clean CLI interface
pub use crate::cli::{AppContext, Cli, LogLevel};
pub use crate::core::{BatchRunner, RunOptions, RunSummary, TextTransformer, transform};
pub use crate::infra::{Settings, load_or_create};
