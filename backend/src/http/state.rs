//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::config::Collections;
use crate::db::repository::RecordStore;
use crate::services::Services;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Services wired to the configured record store
    pub services: Services,
}

impl AppState {
    /// Create a new application state around a store.
    pub fn new(store: Arc<dyn RecordStore>, collections: Collections) -> Self {
        Self {
            services: Services::new(store, collections),
        }
    }
}
