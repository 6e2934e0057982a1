use crate::error::{ErrorKind, Result};
use crate::project_dirs;
use cardscan_net::Url;
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CATALOG_URL: &str = "https://api.pokemontcg.io/v2/";
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_CACHE_PREFIX: &str = "cardscan";
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080/";
pub const DEFAULT_LANGUAGE: &str = "eng";
pub const RECOGNITION_ENGINE_URL: &str = "https://cdn.jsdelivr.net/npm/tesseract.js@5/dist/tesseract.min.js";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub resolver: ResolverConfig,
    pub recognition: RecognitionConfig,
}
impl Config {
    /// Check every value that can parse but still be wrong.
    pub fn validate(&self) -> Result<()> {
        self.catalog.base_url()?;
        if self.catalog.search_limit == 0 {
            exn::bail!(ErrorKind::Invalid("catalog.search_limit".to_string()));
        }
        self.cache.origin()?;
        if self.cache.version == 0 {
            exn::bail!(ErrorKind::Invalid("cache.version".to_string()));
        }
        // Used verbatim in generation tags, so surrounding whitespace is invalid too.
        let prefix = &self.cache.prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            exn::bail!(ErrorKind::Invalid("cache.prefix".to_string()));
        }
        if self.recognition.language.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("recognition.language".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Page size of the manual search.
    pub search_limit: u32,
    /// Sent as `X-Api-Key` when present.
    pub api_key: Option<String>,
}
impl CatalogConfig {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).or_raise(|| ErrorKind::Invalid("catalog.base_url".to_string()))
    }
}
impl Default for CatalogConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_CATALOG_URL.to_string(), search_limit: DEFAULT_SEARCH_LIMIT, api_key: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Where generation-scoped stores live. Defaults to the platform cache
    /// directory.
    pub directory: Option<PathBuf>,
    pub prefix: String,
    /// Bump to invalidate every stored response on the next install.
    pub version: u32,
    /// Application origin: relative manifest entries resolve against it, and
    /// only responses from it are stored at runtime.
    pub origin: String,
    pub manifest: Vec<String>,
    pub network_only_hosts: Vec<String>,
    pub offline_message: String,
}
impl CacheConfig {
    pub fn origin(&self) -> Result<Url> {
        Url::parse(&self.origin).or_raise(|| ErrorKind::Invalid("cache.origin".to_string()))
    }

    pub fn directory(&self) -> Result<PathBuf> {
        if let Some(directory) = &self.directory {
            return Ok(directory.clone());
        }
        let dirs = project_dirs().ok_or_raise(|| ErrorKind::NoDirectory("cache"))?;
        Ok(dirs.cache_dir().to_path_buf())
    }
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            prefix: DEFAULT_CACHE_PREFIX.to_string(),
            version: 1,
            origin: DEFAULT_ORIGIN.to_string(),
            manifest: [
                "./",
                "./index.html",
                "./style.css",
                "./app.js",
                "./manifest.json",
                "./icons/icon.svg",
                RECOGNITION_ENGINE_URL,
            ]
            .map(String::from)
            .to_vec(),
            network_only_hosts: vec!["api.pokemontcg.io".to_string()],
            offline_message: "Offline - no connection to the card catalog".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Replaces the builtin known-name list.
    pub names: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Explicit `tesseract` executable; discovered on `PATH` otherwise.
    pub binary: Option<PathBuf>,
    pub language: String,
}
impl Default for RecognitionConfig {
    fn default() -> Self {
        Self { binary: None, language: DEFAULT_LANGUAGE.to_string() }
    }
}
