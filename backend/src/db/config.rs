//! Store configuration and environment variable handling.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use super::repository::MAX_PAGE_SIZE;

/// Default request timeout for remote stores, in seconds.
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;

/// Collection (table) identifiers used by the aggregators.
///
/// Values are opaque to the core: display names or backend table ids both work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    pub books: String,
    pub performance: String,
    pub invoices: String,
    pub notes: String,
    pub authors: String,
    pub clients: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            books: "Books".to_string(),
            performance: "Performance Records".to_string(),
            invoices: "Invoices".to_string(),
            notes: "Notes".to_string(),
            authors: "Writers".to_string(),
            clients: "Clients".to_string(),
        }
    }
}

impl Collections {
    /// Read collection identifiers from the environment.
    ///
    /// # Environment Variables
    /// - `BOOKS_TABLE`, `PERFORMANCE_TABLE`, `INVOICES_TABLE`, `NOTES_TABLE`,
    ///   `AUTHORS_TABLE`, `CLIENTS_TABLE` (optional, default: table display names)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            books: env_or("BOOKS_TABLE", defaults.books),
            performance: env_or("PERFORMANCE_TABLE", defaults.performance),
            invoices: env_or("INVOICES_TABLE", defaults.invoices),
            notes: env_or("NOTES_TABLE", defaults.notes),
            authors: env_or("AUTHORS_TABLE", defaults.authors),
            clients: env_or("CLIENTS_TABLE", defaults.clients),
        }
    }
}

/// Connection settings shared by the remote stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// API key / token. Required by remote stores.
    pub api_key: Option<String>,
    /// Base (Airtable) or project (NocoDB) identifier. Required by remote stores.
    pub base_id: Option<String>,
    /// Endpoint override. `None` selects the backend's hosted endpoint.
    pub api_url: Option<String>,
    /// Records per page, `1..=100`.
    pub page_size: usize,
    /// Per-request timeout in seconds.
    pub timeout_sec: u64,
    pub collections: Collections,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_id: None,
            api_url: None,
            page_size: MAX_PAGE_SIZE,
            timeout_sec: DEFAULT_TIMEOUT_SEC,
            collections: Collections::default(),
        }
    }
}

impl StoreConfig {
    /// Create a store configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_API_KEY` (required for remote stores)
    /// - `DATABASE_BASE_ID` (required for remote stores)
    /// - `DATABASE_API_URL` (optional): endpoint override
    /// - `DATABASE_PAGE_SIZE` (optional, default: 100, max: 100)
    /// - `DATABASE_TIMEOUT_SEC` (optional, default: 30)
    /// - collection names, see [`Collections::from_env`]
    ///
    /// Missing credentials are not an error here; the remote store constructors
    /// reject them.
    ///
    /// # Errors
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, String> {
        let page_size = match non_empty_var("DATABASE_PAGE_SIZE") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| "DATABASE_PAGE_SIZE must be a positive integer".to_string())?,
            None => MAX_PAGE_SIZE,
        };
        if page_size == 0 {
            return Err("DATABASE_PAGE_SIZE must be a positive integer".to_string());
        }

        let timeout_sec = match non_empty_var("DATABASE_TIMEOUT_SEC") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| "DATABASE_TIMEOUT_SEC must be a number of seconds".to_string())?,
            None => DEFAULT_TIMEOUT_SEC,
        };

        Ok(Self {
            api_key: non_empty_var("DATABASE_API_KEY"),
            base_id: non_empty_var("DATABASE_BASE_ID"),
            api_url: non_empty_var("DATABASE_API_URL"),
            page_size: page_size.min(MAX_PAGE_SIZE),
            timeout_sec,
            collections: Collections::from_env(),
        })
    }

    /// Whether both credentials needed by a remote store are present.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.base_id.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.base_id = Some(base_id.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: String) -> String {
    non_empty_var(name).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collections() {
        let c = Collections::default();
        assert_eq!(c.books, "Books");
        assert_eq!(c.performance, "Performance Records");
        assert_eq!(c.clients, "Clients");
    }

    #[test]
    fn test_credentials() {
        let config = StoreConfig::default();
        assert!(!config.has_credentials());
        let config = config.with_credentials("key", "app123");
        assert!(config.has_credentials());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
