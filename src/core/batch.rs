//! One run over the input directory.
//!
//! Files are discovered once, then each goes through
//! read+decode → transform → backup (optional) → encode+write, strictly in
//! discovery order. A per-file failure becomes a `FileOutcome` in the
//! summary; only startup problems surface as `FatalError`.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cli::{AppContext, Cli};
use crate::core::backup::BackupWriter;
use crate::core::error::{FailureKind, FatalError, FileError, error_chain};
use crate::core::transform::{TextTransformer, has_quote_markers};
use crate::infra::config::{Settings, load_or_create};
use crate::infra::io::{read_document, write_output};
use crate::infra::logging::init_logging;
use crate::infra::walk::FileWalker;

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: String,
    #[serde(flatten)]
    pub status: FileStatus,
    pub backup: BackupStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Processed { bytes_written: usize },
    Failed { kind: FailureKind, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BackupStatus {
    Disabled,
    Skipped,
    Copied { path: PathBuf },
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Processed { .. })
    }
}

/// Accumulated result of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub backup_failures: usize,
    pub deleted: usize,
    pub files: Vec<FileOutcome>,
}

impl RunSummary {
    fn record(&mut self, outcome: FileOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if matches!(outcome.backup, BackupStatus::Failed { .. }) {
            self.backup_failures += 1;
        }
        self.files.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }
}

/// Options that come from the command line rather than the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub delete_originals: bool,
}

/// Drives a run for one configuration.
pub struct BatchRunner<'a> {
    settings: &'a Settings,
    options: RunOptions,
    transformer: TextTransformer<'a>,
    backup: Option<BackupWriter>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(settings: &'a Settings, options: RunOptions) -> Self {
        let backup = settings
            .backup_original
            .then(|| BackupWriter::new(settings.backup_dir()));

        Self {
            settings,
            options,
            transformer: TextTransformer::new(&settings.keywords),
            backup,
        }
    }

    /// Discover and process every input file.
    pub fn run(&self) -> Result<RunSummary, FatalError> {
        let settings = self.settings;

        let files = FileWalker::text_files()?.list(&settings.input_dir)?;

        let mut summary = RunSummary::default();
        if files.is_empty() {
            warn!(
                "no text files found in input directory {}",
                settings.input_dir.display()
            );
            return Ok(summary);
        }
        info!("{} text file(s) found in {}", files.len(), settings.input_dir.display());

        if !self.options.dry_run {
            fs::create_dir_all(&settings.output_dir).map_err(|source| FatalError::OutputDir {
                path: settings.output_dir.clone(),
                source,
            })?;
        }

        let total = files.len();
        for (i, path) in files.iter().enumerate() {
            let name = display_name(path);
            info!("processing ({}/{}): {}", i + 1, total, name);

            let outcome = self.process_file(path);
            match &outcome.status {
                FileStatus::Processed { bytes_written } => {
                    info!("'{name}' written to output directory ({bytes_written} bytes)")
                }
                FileStatus::Failed { kind, reason } => {
                    error!(file = %name, kind = ?kind, "{reason}")
                }
            }
            summary.record(outcome);
        }

        if self.options.delete_originals && !self.options.dry_run {
            summary.deleted = self.delete_originals(&files, &summary.files);
        }

        info!(
            "run complete: {} succeeded, {} failed, {} backup failure(s)",
            summary.succeeded, summary.failed, summary.backup_failures
        );

        Ok(summary)
    }

    /// Process a single input file; never fails, the failure is the outcome.
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        // Stays `Skipped` unless the backup step is reached
        let mut backup = if self.backup.is_some() {
            BackupStatus::Skipped
        } else {
            BackupStatus::Disabled
        };

        let status = match self.try_process(path, &mut backup) {
            Ok(bytes_written) => FileStatus::Processed { bytes_written },
            Err(err) => FileStatus::Failed {
                kind: err.kind(),
                reason: error_chain(&err),
            },
        };

        FileOutcome {
            file: display_name(path),
            status,
            backup,
        }
    }

    fn try_process(&self, path: &Path, backup: &mut BackupStatus) -> Result<usize, FileError> {
        let settings = self.settings;

        let (doc, original) = read_document(path, settings.encoding)?;
        if !has_quote_markers(&doc.text) {
            warn!(file = %doc.name, "no quoted lines (starting with '>') found");
        }
        let cleaned = self.transformer.transform(&doc.text);

        let target = settings.output_dir.join(&doc.file_name);

        if self.options.dry_run {
            info!(
                "dry run: would write {} ({} chars)",
                target.display(),
                cleaned.chars().count()
            );
            return Ok(0);
        }

        if let Some(writer) = &self.backup {
            *backup = match writer.backup(&doc.path, original.as_ref()) {
                Ok(copied) => BackupStatus::Copied { path: copied },
                Err(err) => {
                    let reason = error_chain(&err);
                    warn!(file = %doc.name, "backup failed, continuing without it: {reason}");
                    BackupStatus::Failed { reason }
                }
            };
        }

        // Release a possible memory map before writing
        drop(original);

        write_output(&target, &cleaned, settings.encoding)
    }

    /// Remove originals that were written successfully (and, with backups
    /// enabled, backed up). Returns how many were removed.
    fn delete_originals(&self, files: &[PathBuf], outcomes: &[FileOutcome]) -> usize {
        let mut deleted = 0;

        for (path, outcome) in files.iter().zip(outcomes) {
            let backed_up = match outcome.backup {
                BackupStatus::Disabled | BackupStatus::Copied { .. } => true,
                BackupStatus::Skipped | BackupStatus::Failed { .. } => false,
            };

            if !outcome.is_success() || !backed_up {
                debug!("keeping original {}", path.display());
                continue;
            }

            match fs::remove_file(path) {
                Ok(()) => deleted += 1,
                Err(e) => warn!("failed to delete original {}: {e}", path.display()),
            }
        }

        info!("{deleted} original file(s) deleted from the input directory");
        deleted
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Entry point behind `main`: logging, configuration, run, summary output.
pub fn run(cli: Cli, ctx: &AppContext) -> Result<()> {
    let ansi = !ctx.no_color && std::io::stderr().is_terminal();
    let _log_guard = init_logging(cli.log_level, &cli.log_file, ansi)?;

    info!("mailtidy {} starting", env!("CARGO_PKG_VERSION"));

    let settings = load_or_create(&cli.config).map_err(|e| {
        error!("{}", error_chain(&e));
        e
    })?;

    let options = RunOptions {
        dry_run: ctx.dry_run,
        delete_originals: cli.delete_originals,
    };

    let summary = BatchRunner::new(&settings, options)
        .run()
        .map_err(|e| {
            error!("{}", error_chain(&e));
            e
        })?;

    if summary.failed == 0 {
        info!("all files processed successfully");
    } else {
        warn!("{} file(s) failed; see log for details", summary.failed);
    }

    print_summary(&summary, ctx)
}

fn print_summary(summary: &RunSummary, ctx: &AppContext) -> Result<()> {
    if ctx.json {
        let line = serde_json::to_string(summary).context("serialize run summary")?;
        println!("{line}");
        return Ok(());
    }

    if ctx.quiet {
        return Ok(());
    }

    let prefix = if ctx.dry_run { "DRY RUN: " } else { "" };
    let line = format!(
        "{prefix}{} processed, {} failed ({} total)",
        summary.succeeded,
        summary.failed,
        summary.total()
    );

    match (ctx.no_color, summary.failed) {
        (true, _) => println!("{line}"),
        (false, 0) => println!("{} {}", "✓".green(), line),
        (false, _) => println!("{} {}", "✗".red(), line.yellow()),
    }

    Ok(())
}
