use serde::{Deserialize, Serialize};

use crate::models::{AuthorId, BookId};

// =========================================================
// Catalog listing types + limits
// =========================================================

/// Row of the "top books" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopBook {
    pub id: BookId,
    /// Empty when the book has no title.
    pub title: String,
    pub author_name: Option<String>,
    pub total_revenues: f64,
    pub total_listening_minutes: f64,
}

/// Row of the "top authors" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAuthor {
    pub id: AuthorId,
    pub name: Option<String>,
    pub total_revenues: f64,
    pub book_count: usize,
}

/// Default row count of the listing endpoints.
pub const DEFAULT_LIST_LIMIT: usize = 10;
/// Largest accepted row count.
pub const MAX_LIST_LIMIT: usize = 100;
