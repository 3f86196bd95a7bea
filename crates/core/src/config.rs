//! Application configuration.
//!
//! Settings are layered from built-in defaults, an optional TOML file under
//! the user's config directory and `VGO_`-prefixed environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE},
    search::DEFAULT_SEARCH_DEBOUNCE,
    store::JsonFileStorage,
};

/// Directory under `~/.config` holding the config file.
pub const CONFIG_DIR: &str = "vgo";
/// Config file name.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix for environment overrides (`VGO_API_KEY`, `VGO_PAGE_SIZE`, ...).
pub const ENV_PREFIX: &str = "VGO";

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# vgo configuration
#
# Every value can also be set through the environment, e.g. VGO_API_KEY.

# RAWG API key (https://rawg.io/apidocs).
# api_key = ""

api_base_url = "https://api.rawg.io/api"
page_size = 20
search_debounce_ms = 500

# Where lists are stored. Defaults to the platform data directory.
# data_dir = ""
"#;

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the catalog service.
    pub api_base_url: String,
    /// Access credential sent as the `key` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Entries requested per listing page.
    pub page_size: u32,
    /// Quiet period before a typed search runs, in milliseconds.
    pub search_debounce_ms: u64,
    /// Directory holding persisted lists.
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            data_dir: JsonFileStorage::default_root(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from an explicit file (which may be absent) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("page_size", i64::from(defaults.page_size))?
            .set_default("search_debounce_ms", defaults.search_debounce_ms as i64)?
            .set_default(
                "data_dir",
                defaults.data_dir.to_string_lossy().to_string(),
            )?
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;

        let mut config: Self = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        config.api_key = config.api_key.filter(|key| !key.trim().is_empty());
        Ok(config)
    }

    /// Debounce delay as a [`Duration`].
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Default config file path.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
