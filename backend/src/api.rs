//! Public API surface of the metrics engine.
//!
//! This file consolidates the result types returned by the services and the
//! HTTP API, plus the entity types they are built from.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::catalog::TopAuthor;
pub use crate::routes::catalog::TopBook;
pub use crate::routes::dashboard::DashboardMetrics;
pub use crate::routes::demographics::AgeDistribution;
pub use crate::routes::demographics::DemographicsData;
pub use crate::routes::demographics::GenderDistribution;
pub use crate::routes::revenue::RevenueMetrics;

pub use crate::models::entities::{
    AuthorId, Book, BookId, Client, ClientId, Invoice, Note, PerformanceSnapshot,
};
pub use crate::models::record::Record;

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
