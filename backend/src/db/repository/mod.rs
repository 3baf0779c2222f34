//! Record store abstraction.
//!
//! - `store`: the [`RecordStore`] trait every backend implements
//! - `query`: list parameters, sort keys and filter dialects
//! - `error`: error type shared by all backends

pub mod error;
pub mod query;
pub mod store;

pub use error::{BoxError, ErrorContext, RepositoryError, RepositoryResult};
pub use query::{
    FilterDialect, ListQuery, SortDirection, SortSpec, COMPARISON_RESERVED, MAX_PAGE_SIZE,
};
pub use store::RecordStore;
