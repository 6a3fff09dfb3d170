//! Shared domain models.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::StoreMetadata;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 7;

/// Generate a fresh opaque game identifier.
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Launchable entry points of a game, relative to its root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    /// Picked automatically when exactly one first-level candidate exists.
    #[serde(default)]
    pub default: Option<String>,
    /// Every candidate, first-level entries before nested ones.
    #[serde(default)]
    pub others: Vec<String>,
}

/// Artwork slot on a game record.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageRole {
    Icon,
    Logo,
    Header,
    Capsule,
    Background,
    LibraryHero,
    VerticalCover,
}

impl ImageRole {
    /// All roles in download order.
    pub const ALL: [ImageRole; 7] = [
        ImageRole::Icon,
        ImageRole::Logo,
        ImageRole::Header,
        ImageRole::Capsule,
        ImageRole::Background,
        ImageRole::LibraryHero,
        ImageRole::VerticalCover,
    ];

    /// Key used in the sidecar document and as the asset filename seed prefix.
    pub fn key(self) -> &'static str {
        match self {
            ImageRole::Icon => "icon",
            ImageRole::Logo => "logo",
            ImageRole::Header => "header",
            ImageRole::Capsule => "capsule",
            ImageRole::Background => "background",
            ImageRole::LibraryHero => "library_hero",
            ImageRole::VerticalCover => "vertical_cover",
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Artwork for a game. Each slot holds a remote URL, a local asset path, or
/// an empty string.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Images {
    pub icon: String,
    pub logo: String,
    pub header: String,
    pub capsule: String,
    pub background: String,
    pub library_hero: String,
    pub vertical_cover: String,
    /// Slots written by other tools, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Images {
    /// Borrow a slot.
    pub fn get(&self, role: ImageRole) -> &str {
        match role {
            ImageRole::Icon => &self.icon,
            ImageRole::Logo => &self.logo,
            ImageRole::Header => &self.header,
            ImageRole::Capsule => &self.capsule,
            ImageRole::Background => &self.background,
            ImageRole::LibraryHero => &self.library_hero,
            ImageRole::VerticalCover => &self.vertical_cover,
        }
    }

    /// Mutably borrow a slot.
    pub fn get_mut(&mut self, role: ImageRole) -> &mut String {
        match role {
            ImageRole::Icon => &mut self.icon,
            ImageRole::Logo => &mut self.logo,
            ImageRole::Header => &mut self.header,
            ImageRole::Capsule => &mut self.capsule,
            ImageRole::Background => &mut self.background,
            ImageRole::LibraryHero => &mut self.library_hero,
            ImageRole::VerticalCover => &mut self.vertical_cover,
        }
    }

    /// Roles whose value is still a remote URL.
    pub fn remote_roles(&self) -> Vec<ImageRole> {
        ImageRole::ALL
            .into_iter()
            .filter(|role| is_remote(self.get(*role)))
            .collect()
    }

    /// Extra slots whose value is a remote URL, in key order.
    pub fn remote_extra_keys(&self) -> Vec<String> {
        self.extra
            .iter()
            .filter(|(_, value)| value.as_str().is_some_and(is_remote))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Whether an image value points at the network rather than the disk.
pub fn is_remote(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
    Missing(()),
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
        RawId::Missing(()) => String::new(),
    })
}

/// Persistent description of one installed game.
///
/// The whole record, unknown fields included, round-trips through the
/// sidecar document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Opaque identifier assigned at creation and never regenerated.
    /// Numeric ids written by other tools are read as their decimal text.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// Display name; the directory name until store metadata replaces it.
    #[serde(default)]
    pub name: String,
    /// Absolute path of the game's root directory.
    #[serde(default)]
    pub path: PathBuf,
    /// Launchable entry points.
    #[serde(default)]
    pub actions: Actions,
    /// Artwork, populated when metadata is edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Images>,
    /// Identifier of the matching store entry, once metadata was fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    /// Short store blurb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Long-form store description (HTML).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_detailed: Option<String>,
    /// Release date as printed by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Supported platforms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    /// Developer credits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub developers: Vec<String>,
    /// Publisher credits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publishers: Vec<String>,
    /// User tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Store genres.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    /// Store feature categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Fields written by other tools or newer versions.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameRecord {
    /// Create a bare record with a freshly generated id.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, actions: Actions) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            path: path.into(),
            actions,
            images: None,
            store_id: None,
            description: None,
            description_detailed: None,
            release: None,
            platforms: Vec::new(),
            developers: Vec::new(),
            publishers: Vec::new(),
            tags: Vec::new(),
            genres: Vec::new(),
            categories: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Fill identity fields an externally written sidecar left out.
    ///
    /// `name` and `path` default to the folder the record was found in; a
    /// missing id gets a fresh one. Returns whether the id was generated.
    pub fn fill_identity(&mut self, folder_name: &str, folder: &Path) -> bool {
        if self.name.trim().is_empty() {
            self.name = folder_name.to_string();
        }
        if self.path.as_os_str().is_empty() {
            self.path = folder.to_path_buf();
        }
        if self.id.trim().is_empty() {
            self.id = generate_id();
            return true;
        }
        false
    }

    /// Copy store metadata onto this record. `id`, `path` and `actions` are
    /// left untouched.
    pub fn apply_store_metadata(&mut self, metadata: StoreMetadata) {
        self.store_id = Some(metadata.id);
        if !metadata.name.trim().is_empty() {
            self.name = metadata.name;
        }
        self.description = metadata.description;
        self.description_detailed = metadata.description_detailed;
        self.release = metadata.release;
        self.platforms = metadata.platforms;
        self.developers = metadata.developers;
        self.publishers = metadata.publishers;
        self.tags = metadata.tags;
        self.genres = metadata.genres;
        self.categories = metadata.categories;
        self.images = Some(metadata.images);
    }

    /// Case-insensitive match against name and descriptive fields.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let contains = |value: &str| value.to_lowercase().contains(&needle);
        contains(&self.name)
            || self.description.as_deref().map(contains).unwrap_or(false)
            || self
                .developers
                .iter()
                .chain(&self.publishers)
                .chain(&self.genres)
                .chain(&self.tags)
                .any(|value| contains(value.as_str()))
    }
}
