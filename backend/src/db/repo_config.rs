//! Dashboard configuration file support.
//!
//! Reads store settings and collection names from a `dashboard.toml` file:
//!
//! ```toml
//! [store]
//! type = "airtable"
//! base_id = "app7jhjphxvFJdwzg"
//! page_size = 100
//! timeout_sec = 30
//!
//! [collections]
//! books = "Books"
//! performance = "Performance Records"
//! ```
//!
//! Credentials may be left out of the file; `DATABASE_API_KEY` and
//! `DATABASE_BASE_ID` fill them in.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::{non_empty_var, Collections, StoreConfig, DEFAULT_TIMEOUT_SEC};
use super::factory::StoreKind;
use super::repository::{RepositoryError, MAX_PAGE_SIZE};

/// Dashboard configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub store: StoreSettings,
    #[serde(default)]
    pub collections: Collections,
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(rename = "type")]
    pub store_type: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_id: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_timeout_sec() -> u64 {
    DEFAULT_TIMEOUT_SEC
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: DashboardConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `dashboard.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("dashboard.toml"),
            PathBuf::from("backend/dashboard.toml"),
            PathBuf::from("../dashboard.toml"),
        ];

        for path in search_paths.iter() {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Err(RepositoryError::configuration(
            "No dashboard.toml found in standard locations",
        ))
    }

    /// Get the store kind from configuration.
    pub fn store_kind(&self) -> Result<StoreKind, String> {
        StoreKind::from_str(&self.store.store_type)
    }

    /// Convert to a [`StoreConfig`], filling missing credentials from the environment.
    pub fn to_store_config(&self) -> Result<StoreConfig, RepositoryError> {
        if self.store.page_size == 0 {
            return Err(RepositoryError::configuration(
                "store.page_size must be a positive integer",
            ));
        }

        let settings = &self.store;
        Ok(StoreConfig {
            api_key: settings
                .api_key
                .clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| non_empty_var("DATABASE_API_KEY")),
            base_id: settings
                .base_id
                .clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| non_empty_var("DATABASE_BASE_ID")),
            api_url: settings.api_url.clone().filter(|v| !v.trim().is_empty()),
            page_size: settings.page_size.min(MAX_PAGE_SIZE),
            timeout_sec: settings.timeout_sec,
            collections: self.collections.clone(),
        })
    }
}
