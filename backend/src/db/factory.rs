//! Store factory for dependency injection.
//!
//! This module provides utilities for creating and configuring record store
//! instances based on runtime configuration. The resulting
//! `Arc<dyn RecordStore>` is handed to the services by their constructors.

use log::info;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::{non_empty_var, StoreConfig};
use super::repo_config::DashboardConfig;
#[cfg(feature = "airtable-store")]
use super::repositories::AirtableStore;
use super::repositories::LocalStore;
#[cfg(feature = "nocodb-store")]
use super::repositories::NocoDbStore;
use super::repository::{RecordStore, RepositoryError, RepositoryResult};

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// Airtable REST API (formula filters)
    #[default]
    Airtable,
    /// NocoDB REST API (comparison filters)
    NocoDb,
    /// In-memory local store
    Local,
}

impl FromStr for StoreKind {
    type Err = String;

    /// Parse store kind from string ("airtable", "nocodb", "local").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "airtable" => Ok(Self::Airtable),
            "nocodb" | "noco" => Ok(Self::NocoDb),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown store type: {}", s)),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreKind::Airtable => "airtable",
            StoreKind::NocoDb => "nocodb",
            StoreKind::Local => "local",
        })
    }
}

impl StoreKind {
    /// Get store kind from the environment.
    ///
    /// Reads `STORE_TYPE`. When unset, defaults to Airtable; the in-memory
    /// store is only selected by an explicit `STORE_TYPE=local`, so missing
    /// credentials fail at construction instead of serving empty data.
    ///
    /// # Errors
    /// Returns an error if `STORE_TYPE` names an unknown backend.
    pub fn from_env() -> Result<Self, String> {
        match non_empty_var("STORE_TYPE") {
            Some(val) => val.parse(),
            None => Ok(Self::default()),
        }
    }
}

/// Store factory for creating record store instances.
///
/// # Example
/// ```ignore
/// use dashboard_metrics::db::{StoreConfig, StoreFactory, StoreKind};
///
/// let config = StoreConfig::from_env()?;
/// let store = StoreFactory::create(StoreKind::Airtable, &config)?;
/// let local = StoreFactory::create_local();
/// ```
pub struct StoreFactory;

impl StoreFactory {
    /// Create a store instance based on kind.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn RecordStore>)` - store instance
    /// * `Err(RepositoryError)` - `ConfigurationError` if credentials are
    ///   missing or the backend feature is disabled
    pub fn create(kind: StoreKind, config: &StoreConfig) -> RepositoryResult<Arc<dyn RecordStore>> {
        info!("Creating {} record store", kind);
        match kind {
            StoreKind::Airtable => {
                #[cfg(feature = "airtable-store")]
                {
                    Ok(Arc::new(AirtableStore::new(config)?))
                }
                #[cfg(not(feature = "airtable-store"))]
                {
                    let _ = config;
                    Err(RepositoryError::configuration(
                        "Airtable store feature not enabled",
                    ))
                }
            }
            StoreKind::NocoDb => {
                #[cfg(feature = "nocodb-store")]
                {
                    Ok(Arc::new(NocoDbStore::new(config)?))
                }
                #[cfg(not(feature = "nocodb-store"))]
                {
                    let _ = config;
                    Err(RepositoryError::configuration(
                        "NocoDB store feature not enabled",
                    ))
                }
            }
            StoreKind::Local => Ok(Self::create_local()),
        }
    }

    /// Create an empty in-memory store.
    pub fn create_local() -> Arc<dyn RecordStore> {
        Arc::new(LocalStore::new())
    }

    /// Create a store from environment configuration.
    ///
    /// Reads `STORE_TYPE` and the `DATABASE_*` variables.
    pub fn from_env() -> RepositoryResult<Arc<dyn RecordStore>> {
        let kind = StoreKind::from_env().map_err(RepositoryError::configuration)?;
        let config = StoreConfig::from_env().map_err(RepositoryError::configuration)?;
        Self::create(kind, &config)
    }

    /// Create a store from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn RecordStore>> {
        let config = DashboardConfig::from_file(config_path)?;
        Self::from_dashboard_config(&config)
    }

    /// Create a store from the default configuration file location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn RecordStore>> {
        let config = DashboardConfig::from_default_location()?;
        Self::from_dashboard_config(&config)
    }

    fn from_dashboard_config(config: &DashboardConfig) -> RepositoryResult<Arc<dyn RecordStore>> {
        let kind = config
            .store_kind()
            .map_err(|e| RepositoryError::configuration(format!("Invalid store type: {}", e)))?;
        let store_config = config.to_store_config()?;
        Self::create(kind, &store_config)
    }
}

/// Builder for configuring store creation.
///
/// # Example
/// ```ignore
/// use dashboard_metrics::db::{StoreBuilder, StoreKind};
///
/// let store = StoreBuilder::new()
///     .store_kind(StoreKind::NocoDb)
///     .credentials("token", "p_abc")
///     .api_url("https://noco.example.com")
///     .build()?;
/// ```
pub struct StoreBuilder {
    kind: StoreKind,
    config: StoreConfig,
}

impl StoreBuilder {
    /// Create a new builder: Airtable store with default settings.
    pub fn new() -> Self {
        Self {
            kind: StoreKind::default(),
            config: StoreConfig::default(),
        }
    }

    /// Set the store kind.
    pub fn store_kind(mut self, kind: StoreKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replace the whole store configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn credentials(mut self, api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        self.config = self.config.with_credentials(api_key, base_id);
        self
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config = self.config.with_api_url(api_url);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn timeout_sec(mut self, timeout_sec: u64) -> Self {
        self.config.timeout_sec = timeout_sec;
        self
    }

    /// Load kind and configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, RepositoryError> {
        self.kind = StoreKind::from_env().map_err(RepositoryError::configuration)?;
        self.config = StoreConfig::from_env().map_err(RepositoryError::configuration)?;
        Ok(self)
    }

    /// Load kind and configuration from a TOML file.
    pub fn from_config_file<P: AsRef<Path>>(
        mut self,
        config_path: P,
    ) -> Result<Self, RepositoryError> {
        let file = DashboardConfig::from_file(config_path)?;
        self.kind = file
            .store_kind()
            .map_err(|e| RepositoryError::configuration(format!("Invalid store type: {}", e)))?;
        self.config = file.to_store_config()?;
        Ok(self)
    }

    /// Store configuration the builder will use.
    pub fn store_config(&self) -> &StoreConfig {
        &self.config
    }

    /// Build the store instance.
    pub fn build(self) -> RepositoryResult<Arc<dyn RecordStore>> {
        StoreFactory::create(self.kind, &self.config)
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
