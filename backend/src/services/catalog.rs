//! Catalogue listings shown next to the metrics: books, rankings, notes,
//! invoices and client profiles.

use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{TopAuthor, TopBook};
use crate::db::config::Collections;
use crate::db::repository::{ListQuery, RecordStore, RepositoryResult, SortSpec};
use crate::models::entities::fields;
use crate::models::{AuthorId, Book, Client, Invoice, Note};

fn by_revenue_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Books with positive revenue, highest first, at most `limit`.
///
/// Ties keep fetch order.
pub fn rank_top_books(books: &[Book], limit: usize) -> Vec<TopBook> {
    let mut ranked: Vec<&Book> = books.iter().filter(|b| b.total_revenues > 0.0).collect();
    ranked.sort_by(|a, b| by_revenue_desc(a.total_revenues, b.total_revenues));
    ranked
        .into_iter()
        .take(limit)
        .map(|b| TopBook {
            id: b.id.clone(),
            title: b.title.clone().unwrap_or_default(),
            author_name: b.author_name.clone(),
            total_revenues: b.total_revenues,
            total_listening_minutes: b.total_listening_minutes,
        })
        .collect()
}

/// Authors ranked by summed book revenue, at most `limit`.
///
/// Books without an author reference are skipped; ties keep first-seen order.
pub fn rank_top_authors(books: &[Book], limit: usize) -> Vec<TopAuthor> {
    let mut order: Vec<AuthorId> = Vec::new();
    let mut totals: HashMap<AuthorId, TopAuthor> = HashMap::new();

    for book in books {
        let Some(author) = book.author.as_ref() else {
            continue;
        };
        let entry = totals.entry(author.clone()).or_insert_with(|| {
            order.push(author.clone());
            TopAuthor {
                id: author.clone(),
                name: None,
                total_revenues: 0.0,
                book_count: 0,
            }
        });
        entry.total_revenues += book.total_revenues;
        entry.book_count += 1;
        if entry.name.is_none() {
            entry.name = book.author_name.clone();
        }
    }

    let mut ranked: Vec<TopAuthor> = order
        .into_iter()
        .filter_map(|id| totals.remove(&id))
        .collect();
    ranked.sort_by(|a, b| by_revenue_desc(a.total_revenues, b.total_revenues));
    ranked.truncate(limit);
    ranked
}

/// Read-side listings over the catalogue collections.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    collections: Collections,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>, collections: Collections) -> Self {
        Self { store, collections }
    }

    /// All books, optionally restricted to one client.
    pub async fn list_books(&self, scope: Option<&str>) -> RepositoryResult<Vec<Book>> {
        let mut query = ListQuery::new();
        if let Some(scope) = scope.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(self.store.dialect().equals(fields::CLIENT_EMAIL, scope)?);
        }
        let records = self
            .store
            .fetch_all(&self.collections.books, &query)
            .await
            .map_err(|e| e.with_collection(self.collections.books.as_str()))?;
        Ok(records.into_iter().map(Book::from_record).collect())
    }

    /// One book by record id.
    pub async fn book_details(&self, id: &str) -> RepositoryResult<Option<Book>> {
        let record = self
            .store
            .fetch_one_by_id(&self.collections.books, id)
            .await?;
        Ok(record.map(Book::from_record))
    }

    pub async fn top_books(&self, limit: usize) -> RepositoryResult<Vec<TopBook>> {
        let books = self.list_books(None).await?;
        let ranked = rank_top_books(&books, limit);
        debug!("top books: {} of {} ranked", ranked.len(), books.len());
        Ok(ranked)
    }

    pub async fn top_authors(&self, limit: usize) -> RepositoryResult<Vec<TopAuthor>> {
        let books = self.list_books(None).await?;
        let ranked = rank_top_authors(&books, limit);
        debug!("top authors: {} ranked from {} books", ranked.len(), books.len());
        Ok(ranked)
    }

    /// Newest notes first, by `Note ID`.
    pub async fn recent_notes(&self, limit: usize) -> RepositoryResult<Vec<Note>> {
        let query = ListQuery::new()
            .sort(SortSpec::desc(fields::NOTE_ID))
            .max_records(limit);
        let records = self
            .store
            .fetch_all(&self.collections.notes, &query)
            .await
            .map_err(|e| e.with_collection(self.collections.notes.as_str()))?;
        Ok(records.into_iter().map(Note::from_record).collect())
    }

    /// Most recently paid invoices first, by `Payment Date`.
    pub async fn recent_invoices(&self, limit: usize) -> RepositoryResult<Vec<Invoice>> {
        let query = ListQuery::new()
            .sort(SortSpec::desc(fields::PAYMENT_DATE))
            .max_records(limit);
        let records = self
            .store
            .fetch_all(&self.collections.invoices, &query)
            .await
            .map_err(|e| e.with_collection(self.collections.invoices.as_str()))?;
        Ok(records.into_iter().map(Invoice::from_record).collect())
    }

    /// Public profile of the client registered under `email`.
    pub async fn client_profile(&self, email: &str) -> RepositoryResult<Option<Client>> {
        let email_field = fields::EMAIL[0];
        let filter = self.store.dialect().equals(email_field, email.trim())?;
        let record = self
            .store
            .fetch_one_by_filter(&self.collections.clients, &filter)
            .await?;
        Ok(record.map(Client::from_record))
    }
}
