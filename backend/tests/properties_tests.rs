//! Property tests for the pure aggregation functions.

mod support;

use chrono::{TimeZone, Utc};
use dashboard_metrics::models::{Book, Invoice, PerformanceSnapshot};
use dashboard_metrics::services::{
    compute_dashboard_metrics, compute_demographics, percentage_change, tally_invoices,
};
use proptest::prelude::*;
use serde_json::json;
use support::{book_record, demographic_record, invoice_record, snapshot_record};

fn date_string(day_offset: u32) -> String {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (base + chrono::Duration::days(day_offset as i64))
        .format("%Y-%m-%d")
        .to_string()
}

proptest! {
    #[test]
    fn series_lengths_follow_horizon(
        horizon in 1u32..=120,
        revenues in prop::collection::vec((0u32..200, 0.0f64..1000.0), 0..30),
    ) {
        let snapshots: Vec<PerformanceSnapshot> = revenues
            .iter()
            .enumerate()
            .map(|(i, (day, rev))| {
                PerformanceSnapshot::from_record(snapshot_record(
                    &format!("p{}", i), "B1", "a@x.com", &date_string(*day), *rev, 3.0,
                ))
            })
            .collect();
        let books = vec![Book::from_record(book_record("B1", "a@x.com", "2024-01-05", true))];
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let metrics = compute_dashboard_metrics(&books, &snapshots, horizon, now);
        let n = horizon as usize;
        prop_assert_eq!(metrics.labels.len(), n);
        prop_assert_eq!(metrics.day_keys.len(), n);
        prop_assert_eq!(metrics.revenues_series.len(), n);
        prop_assert_eq!(metrics.listening_minutes_series.len(), n);
        prop_assert_eq!(metrics.uploaded_books_series.len(), n);
        prop_assert_eq!(metrics.rating_series.len(), n);
        prop_assert_eq!(metrics.day_keys.last().map(String::as_str), Some("2024-06-01"));
    }

    #[test]
    fn zero_baseline_means_zero_change(current in -1.0e9f64..1.0e9) {
        prop_assert_eq!(percentage_change(current, 0.0), 0.0);
    }

    #[test]
    fn paid_and_unpaid_add_up(
        invoices in prop::collection::vec((0u32..10_000_000, any::<bool>()), 0..50),
    ) {
        let invoices: Vec<Invoice> = invoices
            .iter()
            .enumerate()
            .map(|(i, (cents, paid))| {
                let amount = *cents as f64 / 100.0;
                Invoice::from_record(invoice_record(&format!("i{}", i), json!(amount), *paid))
            })
            .collect();

        let tally = tally_invoices(&invoices);
        prop_assert_eq!(tally.paid_micros + tally.unpaid_micros, tally.total_micros);
        prop_assert!(!tally.saturated);
        prop_assert_eq!(tally.invoice_count, invoices.len());
    }

    #[test]
    fn demographic_percentages_stay_in_range(
        shares in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0, 0u32..60), 0..20),
    ) {
        let snapshots: Vec<PerformanceSnapshot> = shares
            .iter()
            .enumerate()
            .map(|(i, (male, female, day))| {
                PerformanceSnapshot::from_record(demographic_record(
                    &format!("d{}", i),
                    &format!("B{}", i % 4),
                    &date_string(*day),
                    *male,
                    *female,
                ))
            })
            .collect();

        let data = compute_demographics(&snapshots);
        prop_assert!(data.books_counted <= 4);
        for value in [
            data.gender_distribution.male,
            data.gender_distribution.female,
            data.age_distribution.age_18_24,
            data.age_distribution.age_25_34,
            data.age_distribution.age_35_44,
        ] {
            prop_assert!((0..=100).contains(&value));
        }
    }
}
