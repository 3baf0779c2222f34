//! # Dashboard Metrics
//!
//! Metrics aggregation engine for a content-distribution dashboard.
//!
//! The crate turns raw, denormalized records (books, performance snapshots,
//! invoices) read from a hosted table store into the statistics the
//! dashboard renders: period totals, period-over-period percentage changes,
//! daily time series and audience demographics.
//!
//! ## Architecture
//!
//! - [`db`]: the [`db::RecordStore`] abstraction, its Airtable, NocoDB and
//!   in-memory implementations, configuration and the store factory
//! - [`models`]: generic records and the typed entities built from them
//! - [`services`]: metrics, demographics, revenue and catalog aggregation
//! - [`routes`]: result types and route names
//! - [`api`]: consolidated public types
//! - [`http`]: Axum-based JSON API (feature `http-server`)
//!
//! ## Example
//!
//! ```ignore
//! use dashboard_metrics::db::{StoreConfig, StoreFactory, StoreKind};
//! use dashboard_metrics::services::MetricsEngine;
//!
//! let config = StoreConfig::from_env()?;
//! let store = StoreFactory::create(StoreKind::Airtable, &config)?;
//! let engine = MetricsEngine::new(store, config.collections.clone());
//! let metrics = engine.compute("client@example.com", 30).await?;
//! ```

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
