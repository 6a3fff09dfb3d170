use std::fmt;

use xxhash_rust::xxh3::xxh3_128;

use crate::error::AssetError;

/// Image container recognised from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `\x89PNG\r\n\x1a\n`
    Png,
    /// `FF D8 FF`
    Jpeg,
    /// `GIF87a` / `GIF89a`
    Gif,
    /// `RIFF....WEBP`
    Webp,
    /// Windows icon or cursor.
    Ico,
}

impl ImageFormat {
    /// Sniff the format from the first bytes of `data`.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            [0x00, 0x00, 0x01 | 0x02, 0x00, ..] => Some(Self::Ico),
            _ => None,
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Ico => "ico",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Extension for `data`, falling back to `jpg` for unknown content.
pub fn extension_for(data: &[u8]) -> &'static str {
    ImageFormat::detect(data)
        .map(ImageFormat::extension)
        .unwrap_or("jpg")
}

/// 32 lowercase hex characters derived only from `seed`.
pub fn seed_digest(seed: &str) -> String {
    format!("{:032x}", xxh3_128(seed.as_bytes()))
}

/// Build `<digest>.<ext>` for an asset.
///
/// The digest depends only on `seed`; `data` is inspected solely to pick the
/// extension.
pub fn generate_filename(seed: &str, data: &[u8]) -> Result<String, AssetError> {
    if seed.is_empty() {
        return Err(AssetError::MissingParameter("seed"));
    }
    if data.is_empty() {
        return Err(AssetError::MissingParameter("content"));
    }
    Ok(format!("{}.{}", seed_digest(seed), extension_for(data)))
}
