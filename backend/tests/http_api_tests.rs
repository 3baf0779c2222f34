//! End-to-end requests through the axum router over a local store.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use dashboard_metrics::db::{Collections, LocalStore};
use dashboard_metrics::http::{create_router, AppState};
use dashboard_metrics::models::Record;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router_over(store: Arc<LocalStore>) -> Router {
    create_router(AppState::new(store, Collections::default()))
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_reports_backend() {
    let (status, body) = get_json(router_over(Arc::new(support::scenario_store())), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "local");
    assert_eq!(body["store"], "connected");
}

#[tokio::test]
async fn test_dashboard_for_client() {
    let router = router_over(Arc::new(support::scenario_store()));
    let (status, body) = get_json(router, "/v1/dashboard?client=a@x.com&days=7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_revenues"], json!(15.0));
    assert_eq!(body["uploaded_books_count"], json!(1));
    assert_eq!(body["labels"].as_array().unwrap().len(), 7);
    assert_eq!(body["revenues_series"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_dashboard_rejects_long_horizon() {
    let router = router_over(Arc::new(support::scenario_store()));
    let (status, body) = get_json(router, "/v1/dashboard?days=367").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_revenue_and_demographics() {
    let store = Arc::new(support::scenario_store());

    let (status, body) = get_json(router_over(store.clone()), "/v1/revenue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_revenue"], json!(150.0));
    assert_eq!(body["total_paid_revenue"], json!(100.0));
    assert_eq!(body["total_unpaid_revenue"], json!(50.0));

    let (status, body) = get_json(router_over(store), "/v1/demographics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["genderDistribution"].is_object());
    assert!(body["ageDistribution"]["18-24"].is_number());
}

#[tokio::test]
async fn test_client_scope_cannot_add_filter_clauses() {
    let store = Arc::new(support::scenario_store());

    let (status, body) = get_json(
        router_over(store.clone()),
        "/v1/dashboard?client=x%29~or%28Client%20Email%2Cneq%2Cx",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = get_json(router_over(store), "/v1/books?client=a%2Cb%40x.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_book_is_not_found() {
    let router = router_over(Arc::new(support::scenario_store()));
    let (status, body) = get_json(router, "/v1/books/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_books_listing_scoped_by_client() {
    let router = router_over(Arc::new(support::scenario_store()));
    let (status, body) = get_json(router, "/v1/books?client=b@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["books"][0]["id"], "B2");
}

#[tokio::test]
async fn test_client_profile_hides_credentials() {
    let store = Arc::new(support::scenario_store());
    store.insert(
        "Clients",
        Record::from_json(
            "c1",
            json!({
                "client_name": "Acme",
                "email": "c@x.com",
                "password": "hunter2",
                "Country": "ES"
            }),
        ),
    );

    let (status, body) = get_json(router_over(store.clone()), "/v1/clients/c@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "c1");
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["Country"], "ES");
    assert!(!body.to_string().contains("hunter2"));

    let (status, _) = get_json(router_over(store), "/v1/clients/nobody@x.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_outage_maps_to_bad_gateway() {
    let store = Arc::new(support::scenario_store());
    store.set_healthy(false);

    let (status, body) = get_json(router_over(store.clone()), "/v1/dashboard").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "BACKEND_ERROR");

    let (status, body) = get_json(router_over(store), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["store"].as_str().unwrap().starts_with("error"));
}

#[tokio::test]
async fn test_limit_validation() {
    let router = router_over(Arc::new(support::scenario_store()));
    let (status, _) = get_json(router, "/v1/top-books?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
