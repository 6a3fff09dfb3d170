use std::{collections::HashMap, time::Duration};

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    error::StoreError,
    models::Images,
    store::{SearchHit, StoreMetadata, SEARCH_LIMIT},
};

const SEARCH_URL: &str = "https://store.steampowered.com/api/storesearch";
const DETAILS_URL: &str = "https://store.steampowered.com/api/appdetails";
const CDN_URL: &str = "https://cdn.akamai.steamstatic.com/steam/apps";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the public Steam storefront endpoints.
#[derive(Debug, Clone)]
pub struct SteamStore {
    http: reqwest::Client,
    language: String,
    country_code: String,
}

impl SteamStore {
    /// Build a client for the given store locale.
    pub fn new(
        language: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            language: language.into(),
            country_code: country_code.into(),
        })
    }

    /// Build a client using the locale from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        Self::new(&config.language, &config.country_code)
    }

    /// Search the store for applications matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StoreError::EmptyQuery);
        }

        debug!(%query, "searching store");
        let body = self
            .get(
                SEARCH_URL,
                &[
                    ("term", query),
                    ("l", self.language.as_str()),
                    ("cc", self.country_code.as_str()),
                ],
            )
            .await?;
        parse_search(&body)
    }

    /// Fetch the detail document for `app_id`.
    pub async fn details(&self, app_id: &str) -> Result<StoreMetadata, StoreError> {
        let app_id = app_id.trim();
        if app_id.is_empty() {
            return Err(StoreError::NotFound(String::new()));
        }

        debug!(%app_id, "fetching store details");
        let body = self
            .get(
                DETAILS_URL,
                &[
                    ("appids", app_id),
                    ("l", self.language.as_str()),
                    ("cc", self.country_code.as_str()),
                ],
            )
            .await?;
        parse_details(app_id, &body)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String, StoreError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("store rate limit reached");
            return Err(StoreError::RateLimited);
        }
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Turn a `storesearch` response body into at most [`SEARCH_LIMIT`] app hits.
pub fn parse_search(body: &str) -> Result<Vec<SearchHit>, StoreError> {
    let response: RawSearch = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .filter(|item| item.kind == "app")
        .take(SEARCH_LIMIT)
        .map(|item| SearchHit {
            id: item.id.to_string(),
            name: item.name,
            thumbnail: item.tiny_image.filter(|url| !url.is_empty()),
        })
        .collect())
}

/// Turn an `appdetails` response body into [`StoreMetadata`].
pub fn parse_details(app_id: &str, body: &str) -> Result<StoreMetadata, StoreError> {
    let mut response: HashMap<String, RawEntry> = serde_json::from_str(body)?;
    let entry = response
        .remove(app_id)
        .filter(|entry| entry.success)
        .and_then(|entry| entry.data)
        .filter(Value::is_object)
        .ok_or_else(|| StoreError::NotFound(app_id.to_string()))?;
    let data: RawAppData = serde_json::from_value(entry)?;

    let id = data
        .steam_appid
        .map(|id| id.to_string())
        .unwrap_or_else(|| app_id.to_string());
    let images = Images {
        icon: String::new(),
        logo: format!("{CDN_URL}/{id}/logo.png"),
        header: data
            .header_image
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("{CDN_URL}/{id}/header.jpg")),
        capsule: format!("{CDN_URL}/{id}/capsule_231x87.jpg"),
        background: data.background.unwrap_or_default(),
        library_hero: format!("{CDN_URL}/{id}/library_hero.jpg"),
        vertical_cover: format!("{CDN_URL}/{id}/library_600x900.jpg"),
        ..Images::default()
    };

    Ok(StoreMetadata {
        name: data.name,
        description: non_empty(data.short_description),
        description_detailed: non_empty(data.detailed_description),
        release: non_empty(data.release_date.map(|release| release.date)),
        platforms: data.platforms.enabled(),
        developers: data.developers,
        publishers: data.publishers,
        tags: descriptions(data.tags),
        genres: descriptions(data.genres),
        categories: descriptions(data.categories),
        images,
        id,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn descriptions(items: Vec<RawDescribed>) -> Vec<String> {
    items.into_iter().map(|item| item.description).collect()
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    items: Vec<RawSearchItem>,
}

#[derive(Debug, Deserialize)]
struct RawSearchItem {
    #[serde(rename = "type", default)]
    kind: String,
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tiny_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawAppData {
    #[serde(default)]
    steam_appid: Option<u64>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    detailed_description: Option<String>,
    #[serde(default)]
    release_date: Option<RawReleaseDate>,
    #[serde(default)]
    platforms: RawPlatforms,
    #[serde(default)]
    developers: Vec<String>,
    #[serde(default)]
    publishers: Vec<String>,
    #[serde(default)]
    tags: Vec<RawDescribed>,
    #[serde(default)]
    genres: Vec<RawDescribed>,
    #[serde(default)]
    categories: Vec<RawDescribed>,
    #[serde(default)]
    header_image: Option<String>,
    #[serde(default)]
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReleaseDate {
    #[serde(default)]
    date: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawPlatforms {
    #[serde(default)]
    windows: bool,
    #[serde(default)]
    mac: bool,
    #[serde(default)]
    linux: bool,
}

impl RawPlatforms {
    fn enabled(&self) -> Vec<String> {
        [
            ("windows", self.windows),
            ("mac", self.mac),
            ("linux", self.linux),
        ]
        .into_iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawDescribed {
    #[serde(default)]
    description: String,
}
