//! Dashboard metrics: period totals, baseline comparison and daily series.

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::DashboardMetrics;
use crate::db::config::Collections;
use crate::db::repository::{ListQuery, RecordStore, RepositoryResult};
use crate::models::entities::fields;
use crate::models::time::{day_key, day_label, day_window, days_before};
use crate::models::{Book, PerformanceSnapshot, Record};

/// Width of the fixed comparison window: the baseline holds everything
/// recorded before `now - BASELINE_WINDOW_DAYS`.
pub const BASELINE_WINDOW_DAYS: i64 = 30;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Percent change from `previous` to `current`, two decimals.
///
/// A zero (or non-finite) baseline yields `0`.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    round_to((current - previous) / previous * 100.0, 2)
}

/// Mean of the positive ratings, or `None` when there are none.
fn mean_rating<'a>(snapshots: impl Iterator<Item = &'a PerformanceSnapshot>) -> Option<f64> {
    let (sum, count) = snapshots
        .filter(|s| s.has_rating())
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.rating, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[derive(Debug, Default)]
struct DayBucket<'a> {
    snapshots: Vec<&'a PerformanceSnapshot>,
    uploaded_books: u64,
}

/// Four aggregates over one period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PeriodTotals {
    revenue: f64,
    listening_minutes: f64,
    uploaded_books: u64,
    average_rating: f64,
}

/// Compute dashboard metrics from already fetched books and snapshots.
///
/// * current period: every snapshot and every active book given
/// * baseline: snapshots recorded strictly before `now - 30 days`, and active
///   books uploaded before that cutoff; with no rated baseline snapshot the
///   baseline rating equals the current one
/// * series: `horizon_days` UTC days ending with `now`'s date, oldest first
///
/// Records with a missing or unparsable date never land in a dated bucket.
pub fn compute_dashboard_metrics(
    books: &[Book],
    snapshots: &[PerformanceSnapshot],
    horizon_days: u32,
    now: DateTime<Utc>,
) -> DashboardMetrics {
    let current = PeriodTotals {
        revenue: snapshots.iter().map(|s| s.revenue).sum(),
        listening_minutes: snapshots.iter().map(|s| s.listening_minutes).sum(),
        uploaded_books: books.iter().filter(|b| b.is_active).count() as u64,
        average_rating: mean_rating(snapshots.iter()).unwrap_or(0.0),
    };

    let cutoff = days_before(now, BASELINE_WINDOW_DAYS);
    let previous_snapshots: Vec<&PerformanceSnapshot> = snapshots
        .iter()
        .filter(|s| s.record_date.is_some_and(|d| d < cutoff))
        .collect();
    let previous = PeriodTotals {
        revenue: previous_snapshots.iter().map(|s| s.revenue).sum(),
        listening_minutes: previous_snapshots.iter().map(|s| s.listening_minutes).sum(),
        uploaded_books: books
            .iter()
            .filter(|b| b.is_active && b.upload_date.is_some_and(|d| d < cutoff))
            .count() as u64,
        average_rating: mean_rating(previous_snapshots.iter().copied())
            .unwrap_or(current.average_rating),
    };

    let window = day_window(now.date_naive(), horizon_days);
    let buckets = bucket_by_day(books, snapshots);

    let mut metrics = DashboardMetrics {
        total_revenues: round_to(current.revenue, 2),
        total_listening_minutes: round_to(current.listening_minutes, 0),
        uploaded_books_count: current.uploaded_books,
        average_rating: round_to(current.average_rating, 1),
        revenues_change: percentage_change(current.revenue, previous.revenue),
        listening_minutes_change: percentage_change(
            current.listening_minutes,
            previous.listening_minutes,
        ),
        uploaded_books_change: percentage_change(
            current.uploaded_books as f64,
            previous.uploaded_books as f64,
        ),
        rating_change: percentage_change(current.average_rating, previous.average_rating),
        labels: Vec::with_capacity(window.len()),
        day_keys: Vec::with_capacity(window.len()),
        revenues_series: Vec::with_capacity(window.len()),
        listening_minutes_series: Vec::with_capacity(window.len()),
        uploaded_books_series: Vec::with_capacity(window.len()),
        rating_series: Vec::with_capacity(window.len()),
    };

    for day in window {
        metrics.labels.push(day_label(day));
        metrics.day_keys.push(day_key(day));

        let (revenue, listening, rating, uploaded) = match buckets.get(&day) {
            Some(bucket) => (
                bucket.snapshots.iter().map(|s| s.revenue).sum::<f64>(),
                bucket.snapshots.iter().map(|s| s.listening_minutes).sum::<f64>(),
                mean_rating(bucket.snapshots.iter().copied()).unwrap_or(0.0),
                bucket.uploaded_books,
            ),
            None => (0.0, 0.0, 0.0, 0),
        };
        metrics.revenues_series.push(round_to(revenue, 2));
        metrics.listening_minutes_series.push(round_to(listening, 0));
        metrics.rating_series.push(round_to(rating, 1));
        metrics.uploaded_books_series.push(uploaded);
    }

    debug!(
        "dashboard metrics: {} books, {} snapshots ({} before cutoff), {} days",
        books.len(),
        snapshots.len(),
        previous_snapshots.len(),
        metrics.horizon()
    );
    metrics
}

fn bucket_by_day<'a>(
    books: &[Book],
    snapshots: &'a [PerformanceSnapshot],
) -> HashMap<NaiveDate, DayBucket<'a>> {
    let mut buckets: HashMap<NaiveDate, DayBucket<'a>> = HashMap::new();
    for snapshot in snapshots {
        if let Some(date) = snapshot.record_date {
            buckets
                .entry(date.date_naive())
                .or_default()
                .snapshots
                .push(snapshot);
        }
    }
    for book in books.iter().filter(|b| b.is_active) {
        if let Some(date) = book.upload_date {
            buckets.entry(date.date_naive()).or_default().uploaded_books += 1;
        }
    }
    buckets
}

/// Computes [`DashboardMetrics`] for one client scope.
///
/// Books and performance snapshots are fetched concurrently, filtered by the
/// store on the `Client Email` column; nothing is re-filtered locally.
#[derive(Clone)]
pub struct MetricsEngine {
    store: Arc<dyn RecordStore>,
    collections: Collections,
}

impl MetricsEngine {
    pub fn new(store: Arc<dyn RecordStore>, collections: Collections) -> Self {
        Self { store, collections }
    }

    /// Metrics for `scope` over a `horizon_days`-day series ending today (UTC).
    ///
    /// An empty scope disables the filter. Any fetch failure aborts the call.
    pub async fn compute(
        &self,
        scope: &str,
        horizon_days: u32,
    ) -> RepositoryResult<DashboardMetrics> {
        self.compute_at(scope, horizon_days, Utc::now()).await
    }

    /// Same as [`MetricsEngine::compute`] with an explicit clock.
    pub async fn compute_at(
        &self,
        scope: &str,
        horizon_days: u32,
        now: DateTime<Utc>,
    ) -> RepositoryResult<DashboardMetrics> {
        let query = self.scope_query(scope)?;
        let (book_records, snapshot_records) = tokio::try_join!(
            self.fetch(&self.collections.books, &query),
            self.fetch(&self.collections.performance, &query),
        )?;

        let books: Vec<Book> = book_records.into_iter().map(Book::from_record).collect();
        let snapshots: Vec<PerformanceSnapshot> = snapshot_records
            .into_iter()
            .map(PerformanceSnapshot::from_record)
            .collect();

        debug!(
            "computing dashboard metrics for scope '{}' over {} days",
            scope, horizon_days
        );
        Ok(compute_dashboard_metrics(&books, &snapshots, horizon_days, now))
    }

    fn scope_query(&self, scope: &str) -> RepositoryResult<ListQuery> {
        let scope = scope.trim();
        if scope.is_empty() {
            return Ok(ListQuery::new());
        }
        let filter = self.store.dialect().equals(fields::CLIENT_EMAIL, scope)?;
        Ok(ListQuery::new().filter(filter))
    }

    async fn fetch(&self, collection: &str, query: &ListQuery) -> RepositoryResult<Vec<Record>> {
        self.store
            .fetch_all(collection, query)
            .await
            .map_err(|e| e.with_collection(collection))
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
