//! Service layer: aggregation over record stores.
//!
//! Each service owns an `Arc<dyn RecordStore>` handed in by its constructor
//! plus the collection names it reads. Calls fetch fresh data every time and
//! return self-contained results; nothing is cached between calls.

pub mod catalog;
pub mod demographics;
pub mod metrics;
pub mod revenue;

pub use catalog::CatalogService;
pub use demographics::{compute_demographics, DemographicsAggregator};
pub use metrics::{compute_dashboard_metrics, percentage_change, MetricsEngine};
pub use revenue::{tally_invoices, RevenueAggregator, RevenueTally};

use std::sync::Arc;

use crate::db::config::Collections;
use crate::db::repository::RecordStore;

/// Every service wired to the same store.
#[derive(Clone)]
pub struct Services {
    pub metrics: MetricsEngine,
    pub demographics: DemographicsAggregator,
    pub revenue: RevenueAggregator,
    pub catalog: CatalogService,
    store: Arc<dyn RecordStore>,
}

impl Services {
    pub fn new(store: Arc<dyn RecordStore>, collections: Collections) -> Self {
        Self {
            metrics: MetricsEngine::new(store.clone(), collections.clone()),
            demographics: DemographicsAggregator::new(store.clone(), collections.clone()),
            revenue: RevenueAggregator::new(store.clone(), collections.clone()),
            catalog: CatalogService::new(store.clone(), collections),
            store,
        }
    }

    /// The shared store, e.g. for health checks.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }
}
