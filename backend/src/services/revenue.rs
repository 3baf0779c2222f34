//! Invoice revenue totals.

use log::{debug, warn};
use std::sync::Arc;

use crate::api::RevenueMetrics;
use crate::db::config::Collections;
use crate::db::repository::{ListQuery, RecordStore, RepositoryResult};
use crate::models::Invoice;

/// Fixed-point resolution of the tally: one millionth of a currency unit.
pub const MICROS_PER_UNIT: i128 = 1_000_000;

/// Running totals in integer micro-units, so the paid/unpaid split adds up
/// exactly and sub-cent amounts are not lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RevenueTally {
    pub total_micros: i128,
    pub paid_micros: i128,
    pub unpaid_micros: i128,
    pub invoice_count: usize,
    /// Set once any running total hit the `i128` bound.
    pub saturated: bool,
}

impl RevenueTally {
    pub fn add(&mut self, amount: f64, is_paid: bool) {
        let micros = to_micros(amount);
        let (total, total_sat) = add_saturating(self.total_micros, micros);
        let (part, part_sat) = if is_paid {
            add_saturating(self.paid_micros, micros)
        } else {
            add_saturating(self.unpaid_micros, micros)
        };
        if (total_sat || part_sat) && !self.saturated {
            warn!("revenue tally saturated after {} invoices", self.invoice_count + 1);
            self.saturated = true;
        }
        self.total_micros = total;
        if is_paid {
            self.paid_micros = part;
        } else {
            self.unpaid_micros = part;
        }
        self.invoice_count += 1;
    }
}

fn add_saturating(acc: i128, micros: i128) -> (i128, bool) {
    match acc.checked_add(micros) {
        Some(sum) => (sum, false),
        None => (acc.saturating_add(micros), true),
    }
}

fn to_micros(amount: f64) -> i128 {
    if !amount.is_finite() {
        warn!("ignoring non-finite invoice amount {}", amount);
        return 0;
    }
    let scaled = (amount * MICROS_PER_UNIT as f64).round();
    if scaled.abs() >= i128::MAX as f64 {
        warn!("invoice amount {} out of range, clamped", amount);
    }
    // float to int casts saturate
    scaled as i128
}

fn from_micros(micros: i128) -> f64 {
    micros as f64 / MICROS_PER_UNIT as f64
}

impl From<RevenueTally> for RevenueMetrics {
    fn from(tally: RevenueTally) -> Self {
        RevenueMetrics {
            total_revenue: from_micros(tally.total_micros),
            total_paid_revenue: from_micros(tally.paid_micros),
            total_unpaid_revenue: from_micros(tally.unpaid_micros),
            invoice_count: tally.invoice_count,
        }
    }
}

/// Sum invoice amounts into total / paid / unpaid.
pub fn tally_invoices(invoices: &[Invoice]) -> RevenueTally {
    let mut tally = RevenueTally::default();
    for invoice in invoices {
        tally.add(invoice.amount, invoice.is_paid);
    }
    debug!(
        "tallied {} invoices: total={} paid={} unpaid={} (micro-units)",
        tally.invoice_count, tally.total_micros, tally.paid_micros, tally.unpaid_micros
    );
    tally
}

/// Computes [`RevenueMetrics`] over every invoice.
#[derive(Clone)]
pub struct RevenueAggregator {
    store: Arc<dyn RecordStore>,
    collections: Collections,
}

impl RevenueAggregator {
    pub fn new(store: Arc<dyn RecordStore>, collections: Collections) -> Self {
        Self { store, collections }
    }

    pub async fn compute(&self) -> RepositoryResult<RevenueMetrics> {
        let collection = &self.collections.invoices;
        let records = self
            .store
            .fetch_all(collection, &ListQuery::new())
            .await
            .map_err(|e| e.with_collection(collection.as_str()))?;
        let invoices: Vec<Invoice> = records.into_iter().map(Invoice::from_record).collect();
        Ok(tally_invoices(&invoices).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalStore;
    use crate::models::Record;
    use serde_json::json;

    fn invoice(id: &str, amount: serde_json::Value, paid: bool) -> Invoice {
        Invoice::from_record(Record::from_json(
            id,
            json!({ "Invoice Amount": amount, "Is Paid": paid }),
        ))
    }

    #[test]
    fn test_paid_and_unpaid_split() {
        let invoices = vec![invoice("i1", json!(100), true), invoice("i2", json!(50), false)];
        let metrics: RevenueMetrics = tally_invoices(&invoices).into();
        assert_eq!(metrics.total_revenue, 150.0);
        assert_eq!(metrics.total_paid_revenue, 100.0);
        assert_eq!(metrics.total_unpaid_revenue, 50.0);
        assert_eq!(metrics.invoice_count, 2);
    }

    #[test]
    fn test_split_adds_up_with_fractional_amounts() {
        let invoices = vec![
            invoice("i1", json!(0.1), true),
            invoice("i2", json!(0.2), false),
            invoice("i3", json!(19.99), true),
        ];
        let tally = tally_invoices(&invoices);
        assert_eq!(tally.paid_micros + tally.unpaid_micros, tally.total_micros);
        assert_eq!(tally.total_micros, 20_290_000);
    }

    #[test]
    fn test_missing_amount_counts_as_zero() {
        let invoices = vec![invoice("i1", json!(null), true)];
        let tally = tally_invoices(&invoices);
        assert_eq!(tally.total_micros, 0);
        assert_eq!(tally.invoice_count, 1);
    }

    #[test]
    fn test_sub_cent_amounts_are_kept() {
        let invoices = vec![
            invoice("i1", json!(0.004), true),
            invoice("i2", json!(0.004), true),
            invoice("i3", json!(0.004), false),
        ];
        let tally = tally_invoices(&invoices);
        assert_eq!(tally.total_micros, 12_000);
        assert_eq!(tally.paid_micros, 8_000);
        assert_eq!(tally.unpaid_micros, 4_000);

        let metrics: RevenueMetrics = tally.into();
        assert!((metrics.total_revenue - 0.012).abs() < 1e-12);
    }

    #[test]
    fn test_huge_amounts_do_not_overflow() {
        let invoices = vec![invoice("i1", json!(1e17), true), invoice("i2", json!(1e17), true)];
        let tally = tally_invoices(&invoices);
        assert!(!tally.saturated);
        assert_eq!(tally.paid_micros, tally.total_micros);
        assert_eq!(tally.total_micros, 2 * to_micros(1e17));

        let metrics: RevenueMetrics = tally.into();
        assert!((metrics.total_revenue / 2e17 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_amounts_saturate() {
        let invoices = vec![invoice("i1", json!(1e300), true), invoice("i2", json!(1e300), false)];
        let tally = tally_invoices(&invoices);
        assert!(tally.saturated);
        assert_eq!(tally.total_micros, i128::MAX);
        assert_eq!(tally.paid_micros, i128::MAX);
        assert_eq!(tally.unpaid_micros, i128::MAX);
        assert_eq!(tally.invoice_count, 2);
    }

    #[tokio::test]
    async fn test_aggregator_reads_invoices() {
        let store = LocalStore::new().with_records(
            "Invoices",
            vec![
                Record::from_json("i1", json!({ "Invoice Amount": 100, "Is Paid": true })),
                Record::from_json("i2", json!({ "Invoice Amount": "50", "Is Paid": false })),
            ],
        );
        let aggregator = RevenueAggregator::new(Arc::new(store), Collections::default());
        let metrics = aggregator.compute().await.unwrap();
        assert_eq!(metrics.total_revenue, 150.0);
        assert_eq!(metrics.total_unpaid_revenue, 50.0);
    }
}
