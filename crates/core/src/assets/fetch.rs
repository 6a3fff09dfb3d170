use std::{
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::{
    assets::filename::generate_filename,
    error::{AssetError, FetchError, FsError},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can download a URL.
///
/// Implementations return `Ok(None)` when the resource does not exist (HTTP
/// 404) and an error for every other failure.
pub trait AssetSource {
    /// Download `url` in full.
    fn get(&self, url: &str) -> impl Future<Output = Result<Option<Vec<u8>>, FetchError>> + Send;
}

/// [`AssetSource`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    http: reqwest::Client,
}

impl HttpAssetSource {
    /// Build a client with a request timeout.
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("playdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl AssetSource for HttpAssetSource {
    async fn get(&self, url: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

/// Download `url` into `dir` under a name derived from `key + id` and the
/// content, returning the written path.
///
/// Returns `Ok(None)` when the remote resource does not exist or came back
/// empty.
pub async fn save_image<S: AssetSource>(
    source: &S,
    url: &str,
    dir: &Path,
    key: &str,
    id: &str,
) -> Result<Option<PathBuf>, AssetError> {
    if url.is_empty() {
        return Err(AssetError::MissingParameter("url"));
    }
    if dir.as_os_str().is_empty() {
        return Err(AssetError::MissingParameter("path"));
    }
    if key.is_empty() {
        return Err(AssetError::MissingParameter("key"));
    }
    if id.is_empty() {
        return Err(AssetError::MissingParameter("id"));
    }

    let Some(bytes) = source.get(url).await? else {
        debug!(%url, "remote asset missing");
        return Ok(None);
    };
    if bytes.is_empty() {
        warn!(%url, "remote asset is empty");
        return Ok(None);
    }

    let filename = generate_filename(&format!("{key}{id}"), &bytes)?;
    let path = dir.join(filename);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|err| FsError::from_io(dir, err))?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|err| FsError::from_io(&path, err))?;

    info!(%url, path = %path.display(), bytes = bytes.len(), "asset saved");
    Ok(Some(path))
}
