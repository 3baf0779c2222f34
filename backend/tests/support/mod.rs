#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

use dashboard_metrics::db::LocalStore;
use dashboard_metrics::models::Record;
use serde_json::{json, Value};

pub const BOOKS: &str = "Books";
pub const PERFORMANCE: &str = "Performance Records";
pub const INVOICES: &str = "Invoices";

pub fn book_record(id: &str, client: &str, upload_date: &str, active: bool) -> Record {
    Record::from_json(
        id,
        json!({
            "Title": format!("Book {}", id),
            "Client Email": [client],
            "upload_date": upload_date,
            "is_active": active,
        }),
    )
}

pub fn snapshot_record(id: &str, book: &str, client: &str, date: &str, revenue: f64, rating: f64) -> Record {
    Record::from_json(
        id,
        json!({
            "Book": [book],
            "Client Email": [client],
            "Record Date": date,
            "Revenue": revenue,
            "Total Listening Minutes": 0.0,
            "5-star Rate": rating,
        }),
    )
}

pub fn demographic_record(id: &str, book: &str, date: &str, male: f64, female: f64) -> Record {
    Record::from_json(
        id,
        json!({
            "Book": [book],
            "Record Date": date,
            "Male Share": male,
            "Female Share": female,
            "( 18 - 24 ) Share": 0.2,
            "( 25 - 34 ) Share": 0.5,
            "( 35 - 44 ) Share": 0.3,
        }),
    )
}

pub fn invoice_record(id: &str, amount: Value, paid: bool) -> Record {
    Record::from_json(id, json!({ "Invoice Amount": amount, "Is Paid": paid }))
}

/// Local store holding the records used by the dashboard scenarios.
pub fn scenario_store() -> LocalStore {
    LocalStore::new()
        .with_records(
            BOOKS,
            vec![
                book_record("B1", "a@x.com", "2024-01-01", true),
                book_record("B2", "b@x.com", "2024-01-02", true),
            ],
        )
        .with_records(
            PERFORMANCE,
            vec![
                snapshot_record("p1", "B1", "a@x.com", "2024-01-01", 10.0, 0.0),
                snapshot_record("p2", "B1", "a@x.com", "2024-01-02", 5.0, 4.0),
                snapshot_record("p3", "B2", "b@x.com", "2024-01-02", 70.0, 5.0),
            ],
        )
        .with_records(
            INVOICES,
            vec![
                invoice_record("i1", json!(100), true),
                invoice_record("i2", json!(50), false),
            ],
        )
}
