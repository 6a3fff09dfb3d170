//! Game library discovery and metadata editing.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    assets::{save_image, AssetSource},
    config::AppConfig,
    fs,
    metadata,
    models::{Actions, GameRecord},
    scan::{self, ScanFilters},
};

/// Where and how to look for games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySettings {
    /// Folder whose sub-folders are games.
    pub root: PathBuf,
    /// File classification rules.
    pub filters: ScanFilters,
}

impl LibrarySettings {
    /// Settings derived from the user configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            root: config.library_root.clone(),
            filters: ScanFilters::new(config.extensions.clone(), config.exclusions.clone()),
        }
    }
}

/// Thread-safe game collection built from the library folder.
#[derive(Clone)]
pub struct Library {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    settings: Arc<LibrarySettings>,
    games: Vec<GameRecord>,
}

impl Library {
    /// Create an empty library; call [`Library::discover`] to populate it.
    pub fn new(settings: LibrarySettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                settings: Arc::new(settings),
                games: Vec::new(),
            })),
        }
    }

    /// Scan the library root and replace the collection with the result.
    ///
    /// Every game folder is processed on its own blocking task; a folder that
    /// fails is logged and left out. Returns the number of games found.
    pub async fn discover(&self) -> Result<usize> {
        let settings = self.inner.read().settings.clone();
        let root = settings.root.clone();
        if root.as_os_str().is_empty() {
            bail!("no library folder configured");
        }

        let dirs = tokio::task::spawn_blocking({
            let root = root.clone();
            move || fs::subdirectories(&root)
        })
        .await
        .context("library listing task failed")?;
        debug!(root = %root.display(), folders = dirs.len(), "scanning library");

        let mut tasks = JoinSet::new();
        for name in dirs {
            let settings = settings.clone();
            tasks.spawn_blocking(move || {
                let path = settings.root.join(&name);
                discover_game(&name, &path, &settings.filters)
            });
        }

        let mut games = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(game)) => games.push(game),
                Ok(None) => {}
                Err(err) => warn!(%err, "game discovery task failed"),
            }
        }

        let total = games.len();
        self.inner.write().games = games;
        info!(root = %root.display(), total, "library discovered");
        Ok(total)
    }

    /// All games in discovery order.
    pub fn games(&self) -> Vec<GameRecord> {
        self.inner.read().games.clone()
    }

    /// All games ordered by name, case-insensitively.
    pub fn games_sorted(&self) -> Vec<GameRecord> {
        let mut games = self.games();
        games.sort_by_cached_key(|game| game.name.to_lowercase());
        games
    }

    /// Look a game up by id, or by case-insensitive exact name.
    pub fn find(&self, needle: &str) -> Option<GameRecord> {
        let inner = self.inner.read();
        inner
            .games
            .iter()
            .find(|game| game.id == needle)
            .or_else(|| {
                inner
                    .games
                    .iter()
                    .find(|game| game.name.eq_ignore_ascii_case(needle))
            })
            .cloned()
    }

    /// Filter games using a case-insensitive substring search.
    pub fn games_matching(&self, query: &str) -> Vec<GameRecord> {
        let needle = query.trim();
        let games = self.games_sorted();
        if needle.is_empty() {
            return games;
        }
        games.into_iter().filter(|game| game.matches(needle)).collect()
    }

    /// Download remote artwork for an edited record, persist it, and replace
    /// the in-memory copy.
    ///
    /// Images are fetched one at a time in role order, then any extra slots.
    /// A missing or empty image becomes an empty string. Any other failure
    /// abandons the edit before the sidecar is written, leaving the
    /// collection untouched.
    pub async fn save_game_metadata<S: AssetSource>(
        &self,
        source: &S,
        mut game: GameRecord,
    ) -> Result<GameRecord> {
        let known = self.inner.read().games.iter().any(|known| known.id == game.id);
        if !known {
            bail!("game {} is not part of the library", game.id);
        }

        let asset_dir = metadata::sidecar_dir(&game.path);
        let key_id = game.id.clone();
        if let Some(images) = game.images.as_mut() {
            for role in images.remote_roles() {
                let url = images.get(role).to_string();
                let saved = save_image(source, &url, &asset_dir, role.key(), &key_id)
                    .await
                    .with_context(|| format!("failed to download {role} for {}", game.name))?;
                *images.get_mut(role) = local_value(saved, &key_id, role.key(), &url);
            }
            for key in images.remote_extra_keys() {
                let Some(url) = images.extra.get(&key).and_then(Value::as_str).map(str::to_string)
                else {
                    continue;
                };
                let saved = save_image(source, &url, &asset_dir, &key, &key_id)
                    .await
                    .with_context(|| format!("failed to download {key} for {}", game.name))?;
                let local = local_value(saved, &key_id, &key, &url);
                images.extra.insert(key, Value::String(local));
            }
        }

        metadata::save(&game)
            .with_context(|| format!("failed to save metadata for {}", game.name))?;

        {
            let mut inner = self.inner.write();
            match inner.games.iter().position(|known| known.id == game.id) {
                Some(index) => inner.games[index] = game.clone(),
                None => inner.games.push(game.clone()),
            }
        }
        info!(game_id = %game.id, name = %game.name, "metadata saved");
        Ok(game)
    }

    /// Open one of a game's actions with the system handler.
    ///
    /// `action` is a path relative to the game root; when omitted the default
    /// action is used.
    pub fn launch(&self, game: &GameRecord, action: Option<&str>) -> Result<PathBuf> {
        let action = match action {
            Some(action) => action,
            None => game
                .actions
                .default
                .as_deref()
                .ok_or_else(|| anyhow!("{} has no default action", game.name))?,
        };
        let target = resolve_action(&game.path, action)?;
        info!(game_id = %game.id, target = %target.display(), "launching");
        fs::open_externally(&target)
            .with_context(|| format!("failed to launch {}", target.display()))
    }
}

/// Local path for a downloaded slot, or an empty string when the remote
/// image does not exist.
fn local_value(saved: Option<PathBuf>, game_id: &str, slot: &str, url: &str) -> String {
    match saved {
        Some(path) => path.to_string_lossy().into_owned(),
        None => {
            debug!(game_id, slot, url, "image not found, clearing");
            String::new()
        }
    }
}

/// Join a relative action onto the game root. Parent segments are refused so
/// an action can never point outside the game folder.
fn resolve_action(game_path: &Path, action: &str) -> Result<PathBuf> {
    let mut target = game_path.to_path_buf();
    for part in action.split(|c| c == '/' || c == '\\') {
        match part {
            "" | "." => {}
            ".." => bail!("action {action} points outside the game folder"),
            part => target.push(part),
        }
    }
    Ok(target)
}

/// Load or synthesize the record for a single game folder.
fn discover_game(name: &str, path: &Path, filters: &ScanFilters) -> Option<GameRecord> {
    if let Some(mut existing) = metadata::load(path) {
        if existing.fill_identity(name, path) {
            match metadata::save(&existing) {
                Ok(_) => info!(game = %name, id = %existing.id, "assigned missing id"),
                Err(err) => warn!(game = %name, %err, "failed to persist assigned id"),
            }
        }
        debug!(game = %name, id = %existing.id, "loaded existing metadata");
        return Some(existing);
    }

    let shallow = scan::find_files(path, filters, false);
    if shallow.is_empty() {
        debug!(game = %name, "no launchable files, skipping");
        return None;
    }
    let deep = scan::find_files(path, filters, true);

    let game = GameRecord::new(name, path, synthesize_actions(&shallow, deep));
    match metadata::save(&game) {
        Ok(sidecar) => {
            info!(game = %name, id = %game.id, sidecar = %sidecar.display(), "created metadata");
            Some(game)
        }
        Err(err) => {
            warn!(game = %name, %err, "failed to write metadata, skipping");
            None
        }
    }
}

/// Default is the sole first-level candidate; others are the deduplicated
/// union of both scans with first-level entries first.
fn synthesize_actions(shallow: &[String], deep: Vec<String>) -> Actions {
    let default = match shallow {
        [only] => Some(only.clone()),
        _ => None,
    };

    let (mut first_level, mut nested): (Vec<_>, Vec<_>) = shallow
        .iter()
        .cloned()
        .chain(deep)
        .partition(|file| scan::is_first_level(file));
    first_level.sort();
    first_level.dedup();
    nested.sort();
    nested.dedup();
    first_level.extend(nested);

    Actions {
        default,
        others: first_level,
    }
}

#[cfg(test)]
mod tests;
