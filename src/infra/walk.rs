//! Filepath: src/infra/walk.rs
//! Input discovery: lists the files directly under one directory whose
//! names match a set of globs (`*.txt` by default).
//! - Non-recursive; subdirectories such as `backup/` are never entered
//! - Globs match the file name, case-insensitively
//! - Hidden files and symlinked files are included unless disabled
//! - Deterministic ordering for stable logs and tests
//!
//! Backed by the `ignore` crate's walker with every ignore-file filter
//! switched off, and `globset` for name matching.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::core::error::DiscoveryError;

/// Default pattern for input documents.
pub const TEXT_FILE_PATTERN: &str = "*.txt";

/// Flat directory lister with name globs.
pub struct FileWalker
{
    /// Compiled set of file-name patterns; a file is listed if any matches
    include_patterns: GlobSet,

    /// Include hidden (dot) files; default true
    include_hidden: bool,

    /// Follow symbolic links to regular files; default true
    follow_symlinks: bool,
}

impl FileWalker
{
    /// Build a walker listing files whose names match any of `patterns`.
    pub fn new(patterns: &[&str]) -> Result<Self, DiscoveryError>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns
        {
            builder.add(
                GlobBuilder::new(pattern)
                    .case_insensitive(true)
                    .literal_separator(true)
                    .build()?,
            );
        }

        Ok(Self {
            include_patterns: builder.build()?,
            include_hidden: true,
            follow_symlinks: true,
        })
    }

    /// Walker for `*.txt` input documents.
    pub fn text_files() -> Result<Self, DiscoveryError>
    {
        Self::new(&[TEXT_FILE_PATTERN])
    }

    /// (Optional) Include or exclude hidden files (dotfiles).
    pub fn with_include_hidden(
        mut self,
        include_hidden: bool,
    ) -> Self
    {
        self.include_hidden = include_hidden;
        self
    }

    /// (Optional) Follow or skip symbolic links.
    pub fn with_follow_symlinks(
        mut self,
        follow: bool,
    ) -> Self
    {
        self.follow_symlinks = follow;
        self
    }

    /// Internal: construct a flat WalkBuilder for `dir`.
    fn build_walk(
        &self,
        dir: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(dir);

        // Plain directory listing: no .gitignore/.ignore/parent rules
        b.standard_filters(false);

        // WalkBuilder::hidden(true) => *skip* dotfiles
        b.hidden(!self.include_hidden);

        b.follow_links(self.follow_symlinks);

        // Depth 0 is `dir` itself, depth 1 its direct children
        b.max_depth(Some(1));

        b
    }

    /// List matching regular files directly under `dir`, sorted by path.
    pub fn list<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> Result<Vec<PathBuf>, DiscoveryError>
    {
        let dir = dir.as_ref();

        if !dir.exists()
        {
            return Err(DiscoveryError::NotFound(dir.to_path_buf()));
        }
        if !dir.is_dir()
        {
            return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
        }

        // Surface an unreadable root as a hard error rather than an empty list
        fs::read_dir(dir).map_err(|e| DiscoveryError::Unreadable {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;

        let mut out = Vec::new();

        for res in self
            .build_walk(dir)
            .build()
        {
            let entry = match res
            {
                Ok(entry) => entry,
                Err(err) =>
                {
                    warn!("skipping unreadable entry in {}: {err}", dir.display());
                    continue;
                }
            };

            if entry.depth() == 0
            {
                continue;
            }

            let is_file = entry
                .file_type()
                .is_some_and(|ft| ft.is_file());
            if !is_file
            {
                continue;
            }

            let matched = entry
                .path()
                .file_name()
                .is_some_and(|name| {
                    self.include_patterns
                        .is_match(Path::new(name))
                });
            if matched
            {
                out.push(entry.into_path());
            }
        }

        // Deterministic order (stable CLI & tests)
        out.sort();

        debug!("found {} matching file(s) in {}", out.len(), dir.display());
        Ok(out)
    }
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use anyhow::Result;
    use tempfile::TempDir;

    use super::*;

    /// Create a file with parent dirs as needed
    fn write_file(
        root: &Path,
        rel: &str,
        contents: &str,
    ) -> Result<()>
    {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
        {
            std::fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn names(
        root: &Path,
        files: &[PathBuf],
    ) -> Vec<String>
    {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn test_lists_txt_files_only_sorted() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "b.txt", "b")?;
        write_file(root, "a.TXT", "a")?;
        write_file(root, "notes.md", "# no")?;
        write_file(root, "backup/a.txt", "old")?;

        let files = FileWalker::text_files()?.list(root)?;

        assert_eq!(names(root, &files), vec!["a.TXT", "b.txt"]);
        Ok(())
    }

    #[test]
    fn test_gitignore_is_not_consulted() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, ".gitignore", "*.txt")?;
        write_file(root, "mail.txt", "keep")?;

        let files = FileWalker::text_files()?.list(root)?;
        assert_eq!(names(root, &files), vec!["mail.txt"]);
        Ok(())
    }

    #[test]
    fn test_hidden_files_policy() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, ".hidden.txt", "h")?;
        write_file(root, "visible.txt", "v")?;

        let files = FileWalker::text_files()?.list(root)?;
        assert_eq!(names(root, &files), vec![".hidden.txt", "visible.txt"]);

        let files = FileWalker::text_files()?
            .with_include_hidden(false)
            .list(root)?;
        assert_eq!(names(root, &files), vec!["visible.txt"]);
        Ok(())
    }

    #[test]
    fn test_empty_directory_is_ok() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let files = FileWalker::text_files()?.list(temp_dir.path())?;
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_and_non_directory_inputs() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        write_file(root, "file.txt", "x")?;

        let walker = FileWalker::text_files()?;

        let err = walker
            .list(root.join("missing"))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NotFound(_)));

        let err = walker
            .list(root.join("file.txt"))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory(_)));
        Ok(())
    }
}
