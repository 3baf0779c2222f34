//! Record store layer.
//!
//! Read access to the dashboard's externally owned tables through the
//! [`RecordStore`] trait, so backends can be swapped without touching the
//! aggregators.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP API (http/) / embedding application                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services (services/) - aggregation                      │
//! │  - dashboard metrics, demographics, revenue, catalog      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │  Arc<dyn RecordStore>
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  RecordStore trait (repository/)                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼──────────────────┐
//!     │               │                  │
//!  Airtable        NocoDB             Local
//!  (formula)     (comparison)       (in-memory)
//! ```
//!
//! - `repository`: trait, query types and errors
//! - `repositories`: backend implementations
//! - `config` / `repo_config`: environment and `dashboard.toml` settings
//! - `factory`: store construction from configuration
//!
//! # Usage
//! ```ignore
//! use dashboard_metrics::db::StoreFactory;
//! use dashboard_metrics::services::MetricsEngine;
//!
//! let store = StoreFactory::from_env()?;
//! let engine = MetricsEngine::new(store, Default::default());
//! let metrics = engine.compute("client@example.com", 30).await?;
//! ```

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use config::{Collections, StoreConfig};
pub use factory::{StoreBuilder, StoreFactory, StoreKind};
pub use repo_config::DashboardConfig;
#[cfg(feature = "airtable-store")]
pub use repositories::AirtableStore;
pub use repositories::LocalStore;
#[cfg(feature = "nocodb-store")]
pub use repositories::NocoDbStore;
pub use repository::{
    ErrorContext, FilterDialect, ListQuery, RecordStore, RepositoryError, RepositoryResult,
    SortDirection, SortSpec,
};
