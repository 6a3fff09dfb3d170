//! File classification over a game directory.

use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::{config::FilterList, fs::is_hidden_name};

/// Extension and exclusion rules applied to every candidate file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilters {
    /// Accepted filename suffixes, lowercase.
    pub extensions: FilterList,
    /// Substrings that disqualify a file, lowercase.
    pub exclusions: FilterList,
}

impl ScanFilters {
    /// Bundle the two lists.
    pub fn new(extensions: FilterList, exclusions: FilterList) -> Self {
        Self {
            extensions,
            exclusions,
        }
    }

    fn is_excluded(&self, relative: &str, name: &str) -> bool {
        let relative = relative.to_lowercase();
        let name = name.to_lowercase();
        self.exclusions
            .tokens()
            .iter()
            .any(|token| relative.contains(token.as_str()) || name.contains(token.as_str()))
    }

    fn has_accepted_extension(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.extensions
            .tokens()
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }

    /// Whether a file at `relative` (named `name`) is a launch candidate.
    pub fn accepts(&self, relative: &str, name: &str) -> bool {
        !self.is_excluded(relative, name) && self.has_accepted_extension(name)
    }
}

/// Collect candidate files under `root`, as `/`-separated paths relative to it.
///
/// Hidden entries are skipped, directories are only entered when `recursive`
/// is set, and unreadable directories are logged and skipped without
/// affecting their siblings.
pub fn find_files(root: &Path, filters: &ScanFilters, recursive: bool) -> Vec<String> {
    if filters.extensions.is_empty() {
        return Vec::new();
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !is_hidden_name(&entry.file_name().to_string_lossy())
        });

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                warn!(%path, %err, "failed to read directory, skipping subtree");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(relative) = relative_path(root, entry.path()) else {
            continue;
        };
        let name = entry.file_name().to_string_lossy();
        if filters.accepts(&relative, &name) {
            found.push(relative);
        }
    }
    found
}

/// Express `path` relative to `root` with `/` separators.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Whether a relative candidate sits directly in the game root.
pub fn is_first_level(relative: &str) -> bool {
    !relative.contains(&['/', '\\'][..])
}
