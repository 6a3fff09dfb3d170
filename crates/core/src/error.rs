//! Error types raised at the filesystem, HTTP and store boundaries.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure classes produced by the filesystem capability.
#[derive(Debug, Error)]
pub enum FsError {
    /// The path does not exist. Callers usually treat this as "nothing there yet".
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other I/O failure (permissions, short reads, full disk, ...).
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether this error only means the path is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors raised while writing a sidecar document.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Writing the sidecar failed.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The record could not be serialized.
    #[error("failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by an HTTP download.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status other than 404.
    #[error("request to {url} failed with HTTP {status}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },
}

/// Errors raised while naming or persisting a downloaded asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A required input was empty.
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// The download failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing the asset to disk failed.
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Errors raised by the remote store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Search was called with a blank query.
    #[error("search query is empty")]
    EmptyQuery,

    /// Transport-level failure.
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store throttled us.
    #[error("store rate limit exceeded, try again later")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("store request failed with HTTP {0}")]
    Status(u16),

    /// The store has no usable data for the identifier.
    #[error("app {0} not found in store")]
    NotFound(String),

    /// The response body did not have the expected shape.
    #[error("unexpected store response: {0}")]
    Json(#[from] serde_json::Error),
}
