//! Configuration management for dealscout.
//!
//! Settings are read from a TOML file when one is available and fall back to
//! built-in defaults field by field, so a config file only needs to name the
//! values it changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::DealPolicy;
use crate::scrapers::{BrowserEngineConfig, PolitenessPolicy};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "dealscout.toml";

/// Sale keywords, including Korean storefront vocabulary.
const DEFAULT_KEYWORDS: &[&str] = &[
    "sale",
    "markdown",
    "clearance",
    "outlet",
    "promotion",
    "promo",
    "deals",
    "event",
    "할인",
    "세일",
    "특가",
    "기획전",
    "핫딜",
    "쿠폰",
    "프로모션",
    "행사",
    "이벤트",
];

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub discovery: DiscoverySettings,
    pub extraction: ExtractionSettings,
    pub network: NetworkSettings,
    pub browser: BrowserEngineConfig,
    pub paths: ArtifactPaths,
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one, `dealscout.toml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Discovery stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Case-insensitive keywords marking sale pages.
    pub keywords: Vec<String>,
    /// Maximum pages the crawler visits.
    pub max_pages: usize,
    /// Delay between discovery requests in milliseconds.
    pub request_delay_ms: u64,
    /// Sitemap paths always checked in addition to robots.txt directives.
    pub sitemap_paths: Vec<String>,
    /// Paths guessed as sale pages regardless of discovery results.
    pub guessed_paths: Vec<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_pages: 120,
            request_delay_ms: 250,
            sitemap_paths: vec!["/sitemap.xml".to_string(), "/sitemap_index.xml".to_string()],
            guessed_paths: vec![
                "/collections/sale".to_string(),
                "/collections/markdown".to_string(),
                "/pages/promotion".to_string(),
            ],
        }
    }
}

impl DiscoverySettings {
    /// Politeness profile for discovery fetches.
    pub fn politeness(&self) -> PolitenessPolicy {
        PolitenessPolicy::new(Duration::from_millis(self.request_delay_ms), self.max_pages)
    }
}

/// Delay and page cap for one extraction path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProfileSettings {
    pub delay_ms: u64,
    pub max_pages: usize,
}

impl ProfileSettings {
    pub fn policy(&self) -> PolitenessPolicy {
        PolitenessPolicy::new(Duration::from_millis(self.delay_ms), self.max_pages)
    }
}

/// Extraction stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Currency used when structured data names none.
    pub default_currency: String,
    /// Currency guessed for DOM prices with a decimal point (best-effort).
    pub decimal_currency: String,
    /// Currency guessed for DOM prices without one (best-effort).
    pub integer_currency: String,
    /// Plain-HTTP extraction profile.
    pub http: ProfileSettings,
    /// Rendered-browser extraction profile.
    pub browser: ProfileSettings,
    /// Deal predicate for the plain-HTTP pipeline.
    pub http_policy: DealPolicy,
    /// Deal predicate for the rendered-browser pipeline.
    pub browser_policy: DealPolicy,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            default_currency: "KRW".to_string(),
            decimal_currency: "USD".to_string(),
            integer_currency: "KRW".to_string(),
            http: ProfileSettings {
                delay_ms: 1500,
                max_pages: 40,
            },
            browser: ProfileSettings {
                delay_ms: 2000,
                max_pages: 10,
            },
            http_policy: DealPolicy::Discounted,
            browser_policy: DealPolicy::Priced,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// User agent override. Unset means the default desktop Chrome agent.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: 30,
        }
    }
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Locations of the stage handoff artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Discovery artifact (JSON array of candidate URLs).
    pub discovery: PathBuf,
    /// Deals artifact (JSON array of product records).
    pub deals: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            discovery: PathBuf::from("data/sale_pages.json"),
            deals: PathBuf::from("public/product_deals.json"),
        }
    }
}
