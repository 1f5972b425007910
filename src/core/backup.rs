//! Backup of original input files.
//!
//! Each original is copied into `<input_dir>/backup/<name>` before its
//! cleaned output is written. The copy is verified against the bytes that
//! were actually read by comparing blake3 digests. A failed backup is
//! reported to the caller, which keeps processing the file.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use blake3::Hasher as Blake3;
use tracing::debug;

use crate::core::error::BackupError;

/// Copies originals into a single backup directory.
#[derive(Debug, Clone)]
pub struct BackupWriter {
    backup_dir: PathBuf,
}

impl BackupWriter {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copy `source` into the backup directory under the same file name,
    /// replacing an earlier copy. `original` is the content that was read
    /// from `source`; the copy must hash to the same digest.
    pub fn backup(&self, source: &Path, original: &[u8]) -> Result<PathBuf, BackupError> {
        let copy_err = |e: std::io::Error| BackupError::Copy {
            path: source.to_path_buf(),
            source: e,
        };

        let name = source.file_name().ok_or_else(|| {
            copy_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "source path has no file name",
            ))
        })?;

        fs::create_dir_all(&self.backup_dir).map_err(copy_err)?;

        let target = self.backup_dir.join(name);
        fs::copy(source, &target).map_err(copy_err)?;

        let expected = digest_bytes(original);
        let actual = stream_blake3(&target).map_err(copy_err)?;
        if expected != actual {
            return Err(BackupError::Verify {
                path: source.to_path_buf(),
                expected,
                actual,
            });
        }

        debug!("backed up {} -> {} ({actual})", source.display(), target.display());
        Ok(target)
    }
}

/// Digest of in-memory content as `blake3:<hex>`.
pub fn digest_bytes(bytes: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(bytes).to_hex())
}

/// Stream a file into a blake3 digest as `blake3:<hex>`.
fn stream_blake3(path: &Path) -> std::io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Blake3::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("blake3:{}", hasher.finalize().to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_copies_and_verifies() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("mail.txt");
        fs::write(&src, "> 本文").unwrap();

        let writer = BackupWriter::new(tmp.path().join("backup"));
        let copied = writer.backup(&src, "> 本文".as_bytes()).unwrap();

        assert_eq!(copied, tmp.path().join("backup/mail.txt"));
        assert_eq!(fs::read_to_string(&copied).unwrap(), "> 本文");
    }

    #[test]
    fn test_backup_overwrites_previous_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("mail.txt");
        let writer = BackupWriter::new(tmp.path().join("backup"));

        fs::write(&src, "old").unwrap();
        writer.backup(&src, b"old").unwrap();
        fs::write(&src, "new").unwrap();
        let copied = writer.backup(&src, b"new").unwrap();

        assert_eq!(fs::read_to_string(copied).unwrap(), "new");
    }

    #[test]
    fn test_backup_detects_changed_source() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("mail.txt");
        fs::write(&src, "changed on disk").unwrap();

        let writer = BackupWriter::new(tmp.path().join("backup"));
        let err = writer.backup(&src, b"what was read").unwrap_err();

        assert!(matches!(err, BackupError::Verify { .. }));
    }

    #[test]
    fn test_backup_missing_source_is_copy_error() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = BackupWriter::new(tmp.path().join("backup"));
        let err = writer
            .backup(&tmp.path().join("gone.txt"), b"")
            .unwrap_err();

        assert!(matches!(err, BackupError::Copy { .. }));
    }

    #[test]
    fn test_digest_matches_stream() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("x");
        fs::write(&p, b"abc").unwrap();
        assert_eq!(digest_bytes(b"abc"), stream_blake3(&p).unwrap());
    }
}
