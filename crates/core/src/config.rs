//! Application configuration.
//!
//! Settings are layered from built-in defaults, an optional TOML file in the
//! user's config directory and `PLAYDECK_*` environment variables.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Directory under the platform config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "playdeck";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# Playdeck configuration

# Folder containing one sub-folder per installed game.
library_root = ""

# Launchable file extensions, either "a,b" or ["a", "b"].
extensions = ".exe,.bat"

# Files whose name or path contains any of these words are ignored.
exclusions = "unins,crash,PrereqSetup,vc_redist"

# Store locale used when fetching metadata.
language = "english"
country_code = "US"
"#;

/// Raw filter value as written by the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterInput {
    /// Comma-separated tokens, e.g. `.exe,.bat`.
    Delimited(String),
    /// Explicit token list.
    List(Vec<String>),
}

/// Normalized filter tokens: trimmed, lowercased, never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FilterInput", into = "Vec<String>")]
pub struct FilterList(Vec<String>);

impl FilterList {
    /// Build from any iterator of raw tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tokens
                .into_iter()
                .map(|token| token.as_ref().trim().to_lowercase())
                .filter(|token| !token.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated string.
    pub fn parse(delimited: &str) -> Self {
        Self::new(delimited.split(','))
    }

    /// Normalized tokens.
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Whether no tokens remain after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<FilterInput> for FilterList {
    fn from(input: FilterInput) -> Self {
        match input {
            FilterInput::Delimited(value) => Self::parse(&value),
            FilterInput::List(values) => Self::new(values),
        }
    }
}

impl From<FilterList> for Vec<String> {
    fn from(list: FilterList) -> Self {
        list.0
    }
}

impl fmt::Display for FilterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// User preferences consumed by the library scanner and store client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Folder whose sub-folders are games.
    #[serde(default)]
    pub library_root: PathBuf,
    /// Accepted file extensions.
    #[serde(default = "default_extensions")]
    pub extensions: FilterList,
    /// Exclusion words.
    #[serde(default)]
    pub exclusions: FilterList,
    /// Store language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Store country code.
    #[serde(default = "default_country_code")]
    pub country_code: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::new(),
            extensions: default_extensions(),
            exclusions: FilterList::default(),
            language: default_language(),
            country_code: default_country_code(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from an explicit file (which may be absent) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("PLAYDECK"))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Whether a library folder has been configured.
    pub fn has_library(&self) -> bool {
        !self.library_root.as_os_str().is_empty()
    }
}

fn default_extensions() -> FilterList {
    FilterList::parse(".exe,.bat")
}

fn default_language() -> String {
    "english".to_string()
}

fn default_country_code() -> String {
    "US".to_string()
}

/// Location of the user config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default config if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    if path.exists() {
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
