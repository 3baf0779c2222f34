//! Audience demographics across the catalogue.

use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{AgeDistribution, DemographicsData, GenderDistribution};
use crate::db::config::Collections;
use crate::db::repository::{ListQuery, RecordStore, RepositoryResult};
use crate::models::{BookId, PerformanceSnapshot};

/// Whether `candidate` should replace `current` as a book's latest snapshot.
///
/// Later record date wins; a dated snapshot beats an undated one; on a tie
/// the lexicographically greater record id wins, so the choice does not
/// depend on fetch order.
fn is_newer(candidate: &PerformanceSnapshot, current: &PerformanceSnapshot) -> bool {
    match candidate.record_date.cmp(&current.record_date) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.id > current.id,
    }
}

/// Latest snapshot per book. Snapshots without a book reference are skipped.
pub fn latest_per_book(snapshots: &[PerformanceSnapshot]) -> HashMap<&BookId, &PerformanceSnapshot> {
    let mut latest: HashMap<&BookId, &PerformanceSnapshot> = HashMap::new();
    for snapshot in snapshots {
        let Some(book) = snapshot.book.as_ref() else {
            continue;
        };
        latest
            .entry(book)
            .and_modify(|current| {
                if is_newer(snapshot, current) {
                    *current = snapshot;
                }
            })
            .or_insert(snapshot);
    }
    latest
}

fn percent(total: f64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    let value = (total / count as f64 * 100.0).round();
    if value.is_finite() {
        value as i64
    } else {
        0
    }
}

/// Average the demographic shares of each book's latest snapshot.
///
/// Shares are 0–1 fractions; outputs are integer percentages, rounded
/// independently and not renormalized.
pub fn compute_demographics(snapshots: &[PerformanceSnapshot]) -> DemographicsData {
    let latest = latest_per_book(snapshots);
    let count = latest.len();

    let mut male = 0.0;
    let mut female = 0.0;
    let mut age_18_24 = 0.0;
    let mut age_25_34 = 0.0;
    let mut age_35_44 = 0.0;
    for snapshot in latest.values() {
        male += snapshot.male_share;
        female += snapshot.female_share;
        age_18_24 += snapshot.age_18_24_share;
        age_25_34 += snapshot.age_25_34_share;
        age_35_44 += snapshot.age_35_44_share;
    }

    debug!(
        "demographics over {} books from {} snapshots",
        count,
        snapshots.len()
    );

    DemographicsData {
        gender_distribution: GenderDistribution {
            male: percent(male, count),
            female: percent(female, count),
        },
        age_distribution: AgeDistribution {
            age_18_24: percent(age_18_24, count),
            age_25_34: percent(age_25_34, count),
            age_35_44: percent(age_35_44, count),
        },
        books_counted: count,
    }
}

/// Computes [`DemographicsData`] over every performance snapshot.
#[derive(Clone)]
pub struct DemographicsAggregator {
    store: Arc<dyn RecordStore>,
    collections: Collections,
}

impl DemographicsAggregator {
    pub fn new(store: Arc<dyn RecordStore>, collections: Collections) -> Self {
        Self { store, collections }
    }

    pub async fn compute(&self) -> RepositoryResult<DemographicsData> {
        let collection = &self.collections.performance;
        let records = self
            .store
            .fetch_all(collection, &ListQuery::new())
            .await
            .map_err(|e| e.with_collection(collection.as_str()))?;
        let snapshots: Vec<PerformanceSnapshot> = records
            .into_iter()
            .map(PerformanceSnapshot::from_record)
            .collect();
        Ok(compute_demographics(&snapshots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalStore;
    use crate::models::Record;
    use serde_json::json;

    fn snap(id: &str, book: Option<&str>, date: &str, male: f64) -> PerformanceSnapshot {
        let mut fields = json!({
            "Record Date": date,
            "Male Share": male,
            "Female Share": 1.0 - male,
            "( 18 - 24 ) Share": 0.25,
            "( 25 - 34 ) Share": 0.5,
            "( 35 - 44 ) Share": 0.125,
        });
        if let Some(book) = book {
            fields["Book"] = json!([book]);
        }
        PerformanceSnapshot::from_record(Record::from_json(id, fields))
    }

    #[test]
    fn test_latest_snapshot_per_book() {
        let snapshots = vec![
            snap("p1", Some("B1"), "2024-01-05", 0.9),
            snap("p2", Some("B1"), "2024-01-01", 0.1),
            snap("p3", Some("B2"), "2024-01-03", 0.6),
            snap("p4", Some("B2"), "2024-01-04", 0.4),
        ];
        let data = compute_demographics(&snapshots);
        // B1 -> 0.9, B2 -> 0.4
        assert_eq!(data.gender_distribution.male, 65);
        assert_eq!(data.gender_distribution.female, 35);
        assert_eq!(data.books_counted, 2);
    }

    #[test]
    fn test_mean_of_latest_shares() {
        let snapshots = vec![
            snap("p1", Some("B1"), "2024-01-05", 0.40),
            snap("p2", Some("B2"), "2024-01-05", 0.60),
        ];
        let data = compute_demographics(&snapshots);
        assert_eq!(data.gender_distribution.male, 50);
        assert_eq!(data.age_distribution.age_18_24, 25);
        assert_eq!(data.age_distribution.age_25_34, 50);
        assert_eq!(data.age_distribution.age_35_44, 13);
    }

    #[test]
    fn test_tie_break_is_order_independent() {
        let a = snap("recA", Some("B1"), "2024-01-05", 0.2);
        let b = snap("recB", Some("B1"), "2024-01-05", 0.8);
        let forward = compute_demographics(&[a.clone(), b.clone()]);
        let backward = compute_demographics(&[b, a]);
        assert_eq!(forward, backward);
        assert_eq!(forward.gender_distribution.male, 80);
    }

    #[test]
    fn test_dated_beats_undated() {
        let snapshots = vec![
            snap("z-undated", Some("B1"), "", 0.9),
            snap("a-dated", Some("B1"), "2020-01-01", 0.3),
        ];
        let data = compute_demographics(&snapshots);
        assert_eq!(data.gender_distribution.male, 30);
    }

    #[test]
    fn test_snapshots_without_book_are_skipped() {
        let snapshots = vec![snap("p1", None, "2024-01-05", 1.0)];
        let data = compute_demographics(&snapshots);
        assert_eq!(data, DemographicsData::default());
    }

    #[test]
    fn test_no_snapshots() {
        let data = compute_demographics(&[]);
        assert_eq!(data.gender_distribution.male, 0);
        assert_eq!(data.age_distribution.age_35_44, 0);
        assert_eq!(data.books_counted, 0);
    }

    #[tokio::test]
    async fn test_aggregator_reads_performance_collection() {
        let store = LocalStore::new().with_records(
            "Performance Records",
            vec![Record::from_json(
                "p1",
                json!({ "Book": ["B1"], "Record Date": "2024-01-01", "Male Share": 0.7, "Female Share": 0.3 }),
            )],
        );
        let aggregator = DemographicsAggregator::new(Arc::new(store), Collections::default());
        let data = aggregator.compute().await.unwrap();
        assert_eq!(data.gender_distribution.male, 70);
        assert_eq!(data.gender_distribution.female, 30);
    }
}
