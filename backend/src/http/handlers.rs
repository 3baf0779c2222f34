//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{
    Book, BookListResponse, BooksQuery, Client, DashboardMetrics, DashboardQuery,
    DemographicsData, HealthResponse, InvoiceListResponse, LimitQuery, NoteListResponse,
    RevenueMetrics, TopAuthor, TopBook,
};
use super::error::AppError;
use super::state::AppState;
use crate::routes::catalog::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::routes::dashboard::{DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn horizon_days(days: Option<u32>) -> Result<u32, AppError> {
    let days = days.unwrap_or(DEFAULT_HORIZON_DAYS);
    if days > MAX_HORIZON_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be at most {}",
            MAX_HORIZON_DAYS
        )));
    }
    Ok(days)
}

fn list_limit(limit: Option<usize>) -> Result<usize, AppError> {
    match limit.unwrap_or(DEFAULT_LIST_LIMIT) {
        0 => Err(AppError::BadRequest("limit must be positive".to_string())),
        n if n > MAX_LIST_LIMIT => Err(AppError::BadRequest(format!(
            "limit must be at most {}",
            MAX_LIST_LIMIT
        ))),
        n => Ok(n),
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store = state.services.store();
    let store_status = match store.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        backend: store.backend_name().to_string(),
        store: store_status,
    }))
}

// =============================================================================
// Aggregates
// =============================================================================

/// GET /v1/dashboard?client=&days=
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> HandlerResult<DashboardMetrics> {
    let days = horizon_days(query.days)?;
    let scope = query.client.unwrap_or_default();
    let metrics = state.services.metrics.compute(&scope, days).await?;
    Ok(Json(metrics))
}

/// GET /v1/demographics
pub async fn get_demographics(State(state): State<AppState>) -> HandlerResult<DemographicsData> {
    Ok(Json(state.services.demographics.compute().await?))
}

/// GET /v1/revenue
pub async fn get_revenue(State(state): State<AppState>) -> HandlerResult<RevenueMetrics> {
    Ok(Json(state.services.revenue.compute().await?))
}

// =============================================================================
// Catalog
// =============================================================================

/// GET /v1/books?client=
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BooksQuery>,
) -> HandlerResult<BookListResponse> {
    let books = state.services.catalog.list_books(query.client.as_deref()).await?;
    let total = books.len();
    Ok(Json(BookListResponse { books, total }))
}

/// GET /v1/books/{book_id}
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> HandlerResult<Book> {
    state
        .services
        .catalog
        .book_details(&book_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))
}

/// GET /v1/top-books?limit=
pub async fn get_top_books(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Vec<TopBook>> {
    let limit = list_limit(query.limit)?;
    Ok(Json(state.services.catalog.top_books(limit).await?))
}

/// GET /v1/top-authors?limit=
pub async fn get_top_authors(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<Vec<TopAuthor>> {
    let limit = list_limit(query.limit)?;
    Ok(Json(state.services.catalog.top_authors(limit).await?))
}

/// GET /v1/notes?limit=
pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<NoteListResponse> {
    let limit = list_limit(query.limit)?;
    let notes = state.services.catalog.recent_notes(limit).await?;
    let total = notes.len();
    Ok(Json(NoteListResponse { notes, total }))
}

/// GET /v1/invoices?limit=
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> HandlerResult<InvoiceListResponse> {
    let limit = list_limit(query.limit)?;
    let invoices = state.services.catalog.recent_invoices(limit).await?;
    let total = invoices.len();
    Ok(Json(InvoiceListResponse { invoices, total }))
}

/// GET /v1/clients/{email}
pub async fn get_client(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> HandlerResult<Client> {
    state
        .services
        .catalog
        .client_profile(&email)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Client {} not found", email)))
}
