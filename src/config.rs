use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main import configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Category page whose links are the candidate product pages
    #[serde(default = "default_root_url")]
    pub root_url: String,
    /// Pages that need special handling
    #[serde(default)]
    pub pages: SpecialPages,
    /// Directory holding cached pages and images
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// File with one excluded product URL per line
    #[serde(default = "default_exclusions_file")]
    pub exclusions_file: Option<PathBuf>,
    /// Where the JSON catalogue is written
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// What to do when a single page fails to parse or fetch
    #[serde(default)]
    pub on_page_error: ErrorPolicy,
}

/// Pages whose layout is not handled by plain classification
#[derive(Debug, Deserialize, Clone)]
pub struct SpecialPages {
    /// Never parsed; no variant understands its layout
    #[serde(default = "default_steam_url")]
    pub steam_url: String,
    /// Oil processing page, parsed as a generic process table
    #[serde(default = "default_oil_url")]
    pub oil_url: Option<String>,
    /// Barrel page, parsed as filling tables
    #[serde(default = "default_barrel_url")]
    pub barrel_url: Option<String>,
}

/// Behavior when a page fails with a fetch or structure error
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the whole run on the first failing page
    #[default]
    FailFast,
    /// Log the failure and continue with the next page
    Skip,
}

impl Default for SpecialPages {
    fn default() -> Self {
        Self {
            steam_url: default_steam_url(),
            oil_url: default_oil_url(),
            barrel_url: default_barrel_url(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            pages: SpecialPages::default(),
            cache_dir: default_cache_dir(),
            exclusions_file: default_exclusions_file(),
            output: default_output(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            on_page_error: ErrorPolicy::default(),
        }
    }
}

// Default value functions
fn default_root_url() -> String {
    "https://wiki.factorio.com/Category:Intermediate_products".to_string()
}

fn default_steam_url() -> String {
    "https://wiki.factorio.com/Steam".to_string()
}

fn default_oil_url() -> Option<String> {
    Some("https://wiki.factorio.com/Oil_processing".to_string())
}

fn default_barrel_url() -> Option<String> {
    Some("https://wiki.factorio.com/Barrel".to_string())
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_exclusions_file() -> Option<PathBuf> {
    Some(PathBuf::from("productExclusions.txt"))
}

fn default_output() -> PathBuf {
    PathBuf::from("products.json")
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; FactorioWikiImport/0.3)".to_string()
}

impl ImportConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with WIKI_IMPORT__ prefix
    /// 2. wiki-import.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: WIKI_IMPORT__PAGES__BARREL_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("wiki-import").required(false))
            .add_source(
                Environment::with_prefix("WIKI_IMPORT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
