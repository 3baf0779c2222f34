//! Data Transfer Objects for the HTTP API.
//!
//! Result payloads are re-exported from the api module since they already
//! derive Serialize/Deserialize; this file adds query strings and list
//! envelopes.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    AgeDistribution, Book, Client, DashboardMetrics, DemographicsData, GenderDistribution,
    Invoice, Note, RevenueMetrics, TopAuthor, TopBook,
};

/// Query for `GET /v1/dashboard`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// Client scope (email). Absent or empty means every client.
    #[serde(default)]
    pub client: Option<String>,
    /// Series length in days (default: 30, max: 366)
    #[serde(default)]
    pub days: Option<u32>,
}

/// Query for `GET /v1/books`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BooksQuery {
    #[serde(default)]
    pub client: Option<String>,
}

/// Query for the ranked and recent listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitQuery {
    /// Row count (default: 10, max: 100)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response for `GET /v1/books`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
    pub total: usize,
}

/// Response for `GET /v1/notes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteListResponse {
    pub notes: Vec<Note>,
    pub total: usize,
}

/// Response for `GET /v1/invoices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<Invoice>,
    pub total: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Record store backend name
    pub backend: String,
    /// Record store status
    pub store: String,
}
