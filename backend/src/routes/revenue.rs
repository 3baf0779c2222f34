use serde::{Deserialize, Serialize};

// =========================================================
// Revenue types
// =========================================================

/// Invoice totals split by payment status.
///
/// The split is exact in the underlying micro-unit tally; the `f64` fields
/// are that tally scaled down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RevenueMetrics {
    pub total_revenue: f64,
    pub total_paid_revenue: f64,
    pub total_unpaid_revenue: f64,
    pub invoice_count: usize,
}
