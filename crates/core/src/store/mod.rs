//! Remote store metadata lookup.

/// Steam storefront client.
pub mod steam;

use serde::{Deserialize, Serialize};

use crate::models::Images;

pub use steam::SteamStore;

/// Maximum number of hits returned by a search.
pub const SEARCH_LIMIT: usize = 10;

/// One candidate match returned by a store search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Store identifier, as a string.
    pub id: String,
    /// Store title.
    pub name: String,
    /// Small preview image, if the store provides one.
    pub thumbnail: Option<String>,
}

/// Descriptive metadata for a single store entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Store identifier.
    pub id: String,
    /// Store title.
    pub name: String,
    /// Short description.
    pub description: Option<String>,
    /// Long-form description.
    pub description_detailed: Option<String>,
    /// Release date as printed by the store.
    pub release: Option<String>,
    /// Platforms flagged as supported.
    pub platforms: Vec<String>,
    /// Developer credits.
    pub developers: Vec<String>,
    /// Publisher credits.
    pub publishers: Vec<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Genres.
    pub genres: Vec<String>,
    /// Categories.
    pub categories: Vec<String>,
    /// Remote artwork URLs (or empty where the store has none).
    pub images: Images,
}
