#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Playdeck game launcher.
//!
//! This crate discovers games in a library folder, keeps a metadata sidecar
//! next to each one, downloads store artwork under content-derived names and
//! talks to the remote store. Frontends only drive these APIs.

pub mod assets;
pub mod config;
pub mod error;
pub mod fs;
pub mod library;
pub mod metadata;
pub mod models;
pub mod scan;
pub mod store;

pub use assets::{AssetSource, HttpAssetSource};
pub use config::{AppConfig, FilterList};
pub use error::{AssetError, FetchError, FsError, MetadataError, StoreError};
pub use library::{Library, LibrarySettings};
pub use models::{Actions, GameRecord, ImageRole, Images};
pub use scan::ScanFilters;
pub use store::{SearchHit, SteamStore, StoreMetadata};
