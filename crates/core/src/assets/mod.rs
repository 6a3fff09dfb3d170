//! Downloaded artwork: deterministic naming and fetching.

/// HTTP download of remote artwork into a game's asset directory.
pub mod fetch;
/// Content-derived asset filenames.
pub mod filename;

pub use fetch::{save_image, AssetSource, HttpAssetSource};
pub use filename::{generate_filename, ImageFormat};
