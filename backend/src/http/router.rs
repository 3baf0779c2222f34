//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // read-only API, any origin may call it
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Aggregates
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/demographics", get(handlers::get_demographics))
        .route("/revenue", get(handlers::get_revenue))
        // Catalog
        .route("/books", get(handlers::list_books))
        .route("/books/{book_id}", get(handlers::get_book))
        .route("/top-books", get(handlers::get_top_books))
        .route("/top-authors", get(handlers::get_top_authors))
        .route("/notes", get(handlers::list_notes))
        .route("/invoices", get(handlers::list_invoices))
        .route("/clients/{email}", get(handlers::get_client));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
