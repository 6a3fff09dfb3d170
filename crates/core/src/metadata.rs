//! Per-game metadata sidecar stored under `<game>/Playdeck/metadata.json`.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::{error::MetadataError, fs, models::GameRecord};

/// Directory inside each game folder that holds the sidecar and artwork.
pub const SIDECAR_DIR: &str = "Playdeck";
/// Sidecar file name.
pub const SIDECAR_FILE: &str = "metadata.json";

/// Directory holding the sidecar and downloaded assets for a game.
pub fn sidecar_dir(game_path: impl AsRef<Path>) -> PathBuf {
    game_path.as_ref().join(SIDECAR_DIR)
}

/// Full path of a game's sidecar document.
pub fn sidecar_path(game_path: impl AsRef<Path>) -> PathBuf {
    sidecar_dir(game_path).join(SIDECAR_FILE)
}

/// Load the sidecar for the game rooted at `game_path`.
///
/// Returns `None` when the file does not exist. Unreadable files, invalid
/// JSON and documents that are not a non-empty object are logged and also
/// yield `None`, so a single corrupt file never blocks discovery. Any other
/// object is accepted; missing identity fields are left empty for the caller
/// to fill.
pub fn load(game_path: impl AsRef<Path>) -> Option<GameRecord> {
    let path = sidecar_path(game_path);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.is_not_found() => return None,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to read metadata");
            return None;
        }
    };

    let value: Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to parse metadata");
            return None;
        }
    };
    if !matches!(&value, Value::Object(fields) if !fields.is_empty()) {
        warn!(path = %path.display(), "metadata is not a record, ignoring");
        return None;
    }

    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to read metadata fields");
            None
        }
    }
}

/// Persist the full record to its sidecar, creating the directory if needed.
pub fn save(game: &GameRecord) -> Result<PathBuf, MetadataError> {
    let path = sidecar_path(&game.path);
    let serialized = serde_json::to_string_pretty(game)?;
    fs::write(&path, serialized)?;
    Ok(path)
}
