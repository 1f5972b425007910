//! Error taxonomy for a run.
//!
//! Fatal kinds abort the run before any file is touched; per-file kinds are
//! attributed to one input file and end up in the run summary.

use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// Configuration file could not be created, read, or understood.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to create default configuration at {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load configuration from {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("unknown text encoding '{label}' in {path}")]
    UnknownEncoding { label: String, path: PathBuf },
}

/// Input directory could not be listed.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("input directory not found: {0}")]
    NotFound(PathBuf),

    #[error("input path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to list input directory {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("invalid file pattern")]
    Pattern(#[from] globset::Error),
}

/// Backup copy failed; the file is still processed.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("failed to copy {path} to backup")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("backup of {path} does not match the original ({expected} != {actual})")]
    Verify {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Per-file failure: the file is skipped and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not valid {encoding}")]
    Decode { path: PathBuf, encoding: &'static str },

    #[error("output for {path} contains characters not representable in {encoding}")]
    Encode { path: PathBuf, encoding: &'static str },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FileError::Read { .. } => FailureKind::Read,
            FileError::Decode { .. } => FailureKind::Decode,
            FileError::Encode { .. } => FailureKind::Encode,
            FileError::Write { .. } => FailureKind::Write,
        }
    }
}

/// Stable label for a per-file failure, used in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Read,
    Decode,
    Encode,
    Write,
}

/// Anything that stops the run before files are processed.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("failed to create output directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Render an error with its whole `source()` chain on one line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut cur = err.source();
    while let Some(cause) = cur {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        cur = cause.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_includes_io_cause() {
        let err = FileError::Write {
            path: PathBuf::from("out/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error_chain(&err), "failed to write out/a.txt: denied");
        assert_eq!(err.kind(), FailureKind::Write);
    }
}
