//! Record store trait: read access to named collections of records.

use async_trait::async_trait;

use super::error::RepositoryResult;
use super::query::{FilterDialect, ListQuery};
use crate::models::Record;

/// Read-only access to a table-oriented backend.
///
/// Collections are identified by opaque names taken from configuration.
/// Filters in [`ListQuery`] are passed to the backend unmodified; use
/// [`RecordStore::dialect`] to build one without knowing which backend is
/// active.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so a single instance can be shared
/// behind an `Arc` by concurrent requests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Filter language this store understands.
    fn dialect(&self) -> FilterDialect;

    /// Short backend name used in logs ("airtable", "nocodb", "local").
    fn backend_name(&self) -> &'static str;

    /// Check that the backend is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` if healthy
    /// * `Err(RepositoryError)` if the backend cannot be reached
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Reads ====================

    /// Every record of `collection` matching `query.filter`, in backend order.
    ///
    /// Pages are followed until the backend reports no more data or
    /// `query.max_records` is reached. Sorting is applied by the backend and
    /// never redone locally.
    async fn fetch_all(&self, collection: &str, query: &ListQuery)
        -> RepositoryResult<Vec<Record>>;

    /// Single record by id.
    ///
    /// # Returns
    /// * `Ok(Some(record))` if found
    /// * `Ok(None)` if the backend reports the record as missing
    /// * `Err(RepositoryError)` for every other failure
    async fn fetch_one_by_id(&self, collection: &str, id: &str)
        -> RepositoryResult<Option<Record>>;

    /// First record matching `filter`, or `None`.
    async fn fetch_one_by_filter(
        &self,
        collection: &str,
        filter: &str,
    ) -> RepositoryResult<Option<Record>> {
        let query = ListQuery::new().filter(filter).max_records(1);
        let records = self.fetch_all(collection, &query).await?;
        Ok(records.into_iter().next())
    }
}
