//! Locale file I/O.
//!
//! ## `write_if_changed` protocol
//!
//! 1. Render content (already done by caller, see [`render_tree`]).
//! 2. Read the current file, if any.
//! 3. Compare bytes → skip if identical.
//! 4. Write to `<path>.i18nflow.tmp`.
//! 5. Rename to final path (atomic on POSIX).
//!
//! A killed process therefore leaves either the old file or the new one,
//! never a truncated mix.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use i18nflow_core::{tree_from_json, NestedTree};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — on-disk bytes already match.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Pretty JSON, two-space indent, sorted keys, trailing newline.
pub fn render_tree(tree: &NestedTree) -> Result<String, SyncError> {
    let mut json = serde_json::to_string_pretty(tree)?;
    json.push('\n');
    Ok(json)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// What was found at a locale file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalFile {
    Missing,
    Parsed(NestedTree),
    /// Present but unusable; the reason is meant for a warning.
    Malformed(String),
}

impl LocalFile {
    /// The parsed tree, or an empty one for missing and malformed files.
    pub fn into_tree(self) -> NestedTree {
        match self {
            LocalFile::Parsed(tree) => tree,
            LocalFile::Missing | LocalFile::Malformed(_) => NestedTree::new(),
        }
    }
}

/// Read and parse a locale JSON file.
///
/// Only I/O failures other than "not found" are errors; bad JSON and
/// unsupported leaf values come back as [`LocalFile::Malformed`].
pub fn read_tree(path: &Path) -> Result<LocalFile, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_tree(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(LocalFile::Missing),
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            Ok(LocalFile::Malformed("not valid UTF-8".to_string()))
        }
        Err(err) => Err(io_err(path, err)),
    }
}

/// Parse locale file text; never [`LocalFile::Missing`].
pub fn parse_tree(content: &str) -> LocalFile {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(err) => return LocalFile::Malformed(err.to_string()),
    };
    match tree_from_json(value) {
        Ok(tree) => LocalFile::Parsed(tree),
        Err(err) => LocalFile::Malformed(err.to_string()),
    }
}

/// Raw bytes of `path`, or `None` when it does not exist.
pub(crate) fn read_existing(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// `*.json` files directly in `dir`, as (stem, path), sorted by stem.
pub(crate) fn json_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.clone()));
        }
    }
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `content` to `path` unless the file already holds exactly those bytes.
pub fn write_if_changed(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = tmp_path(path);
    write_if_changed_with_tmp(path, content, dry_run, &tmp)
}

fn write_if_changed_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    if read_existing(path)?.as_deref() == Some(content.as_bytes()) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    replace_file(path, content.as_bytes(), tmp)?;
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Unconditional whole-file atomic write.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    replace_file(path, content, &tmp_path(path))
}

fn replace_file(path: &Path, content: &[u8], tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.i18nflow.tmp", path.display()))
}

// ---------------------------------------------------------------------------
// Backups
// ---------------------------------------------------------------------------

/// Copy `path` to `<path>.backup-<unix_millis>` and return the copy's path.
pub fn backup_file(path: &Path, unix_millis: i64) -> Result<PathBuf, SyncError> {
    let backup = PathBuf::from(format!("{}.backup-{unix_millis}", path.display()));
    std::fs::copy(path, &backup).map_err(|e| io_err(&backup, e))?;
    tracing::info!("backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
