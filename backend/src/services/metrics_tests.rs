use super::*;
use crate::db::repositories::LocalStore;
use crate::db::repository::RepositoryError;
use chrono::TimeZone;
use serde_json::json;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn snapshot(id: &str, book: &str, date: &str, revenue: f64, rating: f64) -> PerformanceSnapshot {
    PerformanceSnapshot::from_record(Record::from_json(
        id,
        json!({
            "Book": [book],
            "Record Date": date,
            "Revenue": revenue,
            "Total Listening Minutes": revenue * 2.0,
            "5-star Rate": rating,
        }),
    ))
}

fn book(id: &str, upload_date: &str, active: bool) -> Book {
    Book::from_record(Record::from_json(
        id,
        json!({ "Title": id, "upload_date": upload_date, "is_active": active }),
    ))
}

#[test]
fn test_percentage_change() {
    assert_eq!(percentage_change(150.0, 100.0), 50.0);
    assert_eq!(percentage_change(50.0, 100.0), -50.0);
    assert_eq!(percentage_change(1.0, 3.0), -66.67);
    assert_eq!(percentage_change(100.0, 0.0), 0.0);
    assert_eq!(percentage_change(0.0, 0.0), 0.0);
}

#[test]
fn test_round_to() {
    assert_eq!(round_to(1.005_1, 2), 1.01);
    assert_eq!(round_to(4.25, 1), 4.3);
    assert_eq!(round_to(12.5, 0), 13.0);
    assert_eq!(round_to(-0.001, 2), 0.0);
}

#[test]
fn test_daily_series_and_totals() {
    let snapshots = vec![
        snapshot("p1", "B1", "2024-01-01", 10.0, 0.0),
        snapshot("p2", "B1", "2024-01-02", 5.0, 4.0),
    ];
    let metrics = compute_dashboard_metrics(&[], &snapshots, 2, at(2024, 1, 2));

    assert_eq!(metrics.total_revenues, 15.0);
    assert_eq!(metrics.average_rating, 4.0);
    assert_eq!(metrics.revenues_series, vec![10.0, 5.0]);
    assert_eq!(metrics.rating_series, vec![0.0, 4.0]);
    assert_eq!(metrics.listening_minutes_series, vec![20.0, 10.0]);
    assert_eq!(metrics.day_keys, vec!["2024-01-01", "2024-01-02"]);
    assert_eq!(metrics.labels, vec!["01 Jan", "02 Jan"]);
}

#[test]
fn test_no_baseline_means_zero_change() {
    let snapshots = vec![snapshot("p1", "B1", "2024-03-01", 100.0, 5.0)];
    let metrics = compute_dashboard_metrics(&[], &snapshots, 7, at(2024, 3, 5));
    assert_eq!(metrics.total_revenues, 100.0);
    assert_eq!(metrics.revenues_change, 0.0);
    assert_eq!(metrics.listening_minutes_change, 0.0);
    assert_eq!(metrics.rating_change, 0.0);
}

#[test]
fn test_baseline_window() {
    let snapshots = vec![
        snapshot("old", "B1", "2024-01-01", 50.0, 2.0),
        snapshot("new", "B1", "2024-03-01", 50.0, 4.0),
    ];
    let books = vec![
        book("b-old", "2024-01-01", true),
        book("b-new", "2024-03-01", true),
        book("b-off", "2024-01-01", false),
    ];
    let metrics = compute_dashboard_metrics(&books, &snapshots, 0, at(2024, 3, 5));

    assert_eq!(metrics.total_revenues, 100.0);
    assert_eq!(metrics.revenues_change, 100.0);
    assert_eq!(metrics.uploaded_books_count, 2);
    assert_eq!(metrics.uploaded_books_change, 100.0);
    // current mean 3.0 against baseline 2.0
    assert_eq!(metrics.average_rating, 3.0);
    assert_eq!(metrics.rating_change, 50.0);
}

#[test]
fn test_rating_baseline_falls_back_to_current() {
    let snapshots = vec![
        snapshot("old", "B1", "2024-01-01", 10.0, 0.0),
        snapshot("new", "B1", "2024-03-01", 10.0, 4.0),
    ];
    let metrics = compute_dashboard_metrics(&[], &snapshots, 0, at(2024, 3, 5));
    assert_eq!(metrics.rating_change, 0.0);
}

#[test]
fn test_unparsable_dates_are_excluded_from_buckets() {
    let snapshots = vec![
        snapshot("bad", "B1", "not a date", 7.0, 3.0),
        snapshot("good", "B1", "2024-01-02", 5.0, 0.0),
    ];
    let books = vec![book("b1", "garbage", true), book("b2", "2024-01-02", true)];
    let metrics = compute_dashboard_metrics(&books, &snapshots, 1, at(2024, 1, 2));

    // still part of the current period
    assert_eq!(metrics.total_revenues, 12.0);
    assert_eq!(metrics.uploaded_books_count, 2);
    // but not of any day
    assert_eq!(metrics.revenues_series, vec![5.0]);
    assert_eq!(metrics.uploaded_books_series, vec![1]);
    assert_eq!(metrics.revenues_change, 0.0);
}

#[test]
fn test_inactive_books_not_counted_per_day() {
    let books = vec![
        book("b1", "2024-01-02T08:30:00.000Z", true),
        book("b2", "2024-01-02", false),
        book("b3", "2024-01-01", true),
    ];
    let metrics = compute_dashboard_metrics(&books, &[], 2, at(2024, 1, 2));
    assert_eq!(metrics.uploaded_books_series, vec![1, 1]);
}

#[test]
fn test_zero_horizon() {
    let snapshots = vec![snapshot("p1", "B1", "2024-01-01", 10.0, 0.0)];
    let metrics = compute_dashboard_metrics(&[], &snapshots, 0, at(2024, 1, 2));
    assert!(metrics.labels.is_empty());
    assert!(metrics.revenues_series.is_empty());
    assert!(metrics.rating_series.is_empty());
    assert_eq!(metrics.total_revenues, 10.0);
}

#[test]
fn test_empty_input() {
    let metrics = compute_dashboard_metrics(&[], &[], 3, at(2024, 1, 2));
    assert_eq!(metrics.total_revenues, 0.0);
    assert_eq!(metrics.average_rating, 0.0);
    assert_eq!(metrics.revenues_series, vec![0.0, 0.0, 0.0]);
    assert_eq!(metrics.uploaded_books_series, vec![0, 0, 0]);
}

fn seeded_store() -> LocalStore {
    LocalStore::new()
        .with_records(
            "Books",
            vec![
                Record::from_json(
                    "b1",
                    json!({ "Client Email": ["a@x.com"], "is_active": true, "upload_date": "2024-01-02" }),
                ),
                Record::from_json(
                    "b2",
                    json!({ "Client Email": ["z@x.com"], "is_active": true, "upload_date": "2024-01-02" }),
                ),
            ],
        )
        .with_records(
            "Performance Records",
            vec![
                Record::from_json(
                    "p1",
                    json!({ "Client Email": ["a@x.com"], "Book": ["b1"], "Record Date": "2024-01-02", "Revenue": 8.0 }),
                ),
                Record::from_json(
                    "p2",
                    json!({ "Client Email": ["z@x.com"], "Book": ["b2"], "Record Date": "2024-01-02", "Revenue": 99.0 }),
                ),
            ],
        )
}

#[tokio::test]
async fn test_engine_filters_by_scope() {
    let engine = MetricsEngine::new(Arc::new(seeded_store()), Collections::default());
    let metrics = engine.compute_at("a@x.com", 1, at(2024, 1, 2)).await.unwrap();
    assert_eq!(metrics.total_revenues, 8.0);
    assert_eq!(metrics.uploaded_books_count, 1);
    assert_eq!(metrics.uploaded_books_series, vec![1]);
}

#[tokio::test]
async fn test_engine_empty_scope_reads_everything() {
    let engine = MetricsEngine::new(Arc::new(seeded_store()), Collections::default());
    let metrics = engine.compute_at("", 1, at(2024, 1, 2)).await.unwrap();
    assert_eq!(metrics.total_revenues, 107.0);
    assert_eq!(metrics.uploaded_books_count, 2);
}

#[tokio::test]
async fn test_engine_propagates_store_failure() {
    let store = seeded_store();
    store.set_healthy(false);
    let engine = MetricsEngine::new(Arc::new(store), Collections::default());
    let err = engine.compute("a@x.com", 30).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
}
