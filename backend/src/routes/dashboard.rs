use serde::{Deserialize, Serialize};

// =========================================================
// Dashboard metrics types + horizon bounds
// =========================================================

/// Headline numbers, period-over-period changes and daily series for one scope.
///
/// `labels` and the four `*_series` vectors are parallel and always have one
/// entry per day of the requested horizon, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_revenues: f64,
    pub total_listening_minutes: f64,
    pub uploaded_books_count: u64,
    pub average_rating: f64,

    /// Percent change against the 30-day baseline; `0` when the baseline is `0`.
    pub revenues_change: f64,
    pub listening_minutes_change: f64,
    pub uploaded_books_change: f64,
    pub rating_change: f64,

    pub labels: Vec<String>,
    /// `YYYY-MM-DD` keys matching `labels`.
    pub day_keys: Vec<String>,
    pub revenues_series: Vec<f64>,
    pub listening_minutes_series: Vec<f64>,
    pub uploaded_books_series: Vec<u64>,
    pub rating_series: Vec<f64>,
}

impl DashboardMetrics {
    /// Number of days covered by the series.
    pub fn horizon(&self) -> usize {
        self.labels.len()
    }
}

/// Default horizon of the daily series, in days.
pub const DEFAULT_HORIZON_DAYS: u32 = 30;
/// Largest accepted horizon.
pub const MAX_HORIZON_DAYS: u32 = 366;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_snake_case_names() {
        let metrics = DashboardMetrics {
            labels: vec!["01 Jan".into()],
            day_keys: vec!["2024-01-01".into()],
            revenues_series: vec![1.5],
            listening_minutes_series: vec![3.0],
            uploaded_books_series: vec![1],
            rating_series: vec![4.5],
            ..Default::default()
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("total_revenues").is_some());
        assert!(json.get("revenues_change").is_some());
        assert_eq!(json["uploaded_books_series"][0], 1);
        assert_eq!(metrics.horizon(), 1);
    }
}
