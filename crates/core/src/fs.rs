//! Filesystem capability used by the scanner, metadata store and asset fetcher.
//!
//! Every failure is classified into [`FsError::NotFound`] or [`FsError::Io`]
//! here, so callers never have to inspect error messages.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::error::FsError;

/// A single directory entry as seen by [`list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Bare file name.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl DirEntry {
    /// Hidden entries start with a dot.
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }
}

pub(crate) fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// List the entries of `path` sorted by name.
pub fn list_dir(path: &Path) -> Result<Vec<DirEntry>, FsError> {
    let reader = fs::read_dir(path).map_err(|err| FsError::from_io(path, err))?;
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|err| FsError::from_io(path, err))?;
        let is_dir = entry
            .file_type()
            .map(|ft| ft.is_dir())
            .map_err(|err| FsError::from_io(entry.path(), err))?;
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Names of the visible subdirectories of `path`.
///
/// A missing or unreadable directory yields an empty list; only unexpected
/// failures are logged.
pub fn subdirectories(path: &Path) -> Vec<String> {
    match list_dir(path) {
        Ok(entries) => entries
            .into_iter()
            .filter(|entry| entry.is_dir && !entry.is_hidden())
            .map(|entry| entry.name)
            .collect(),
        Err(FsError::NotFound(_)) => Vec::new(),
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to list directory");
            Vec::new()
        }
    }
}

/// Read a UTF-8 text file.
pub fn read_to_string(path: &Path) -> Result<String, FsError> {
    fs::read_to_string(path).map_err(|err| FsError::from_io(path, err))
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), FsError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|err| FsError::from_io(path, err))
}

/// Create `path` and all missing ancestors.
pub fn ensure_dir(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).map_err(|err| FsError::from_io(path, err))
}

/// Hand `path` to the operating system's default handler.
pub fn open_externally(path: &Path) -> Result<PathBuf, FsError> {
    if !path.exists() {
        return Err(FsError::NotFound(path.to_path_buf()));
    }
    open::that(path).map_err(|err| FsError::from_io(path, err))?;
    Ok(path.to_path_buf())
}
