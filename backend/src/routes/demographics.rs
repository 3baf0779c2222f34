use serde::{Deserialize, Serialize};

// =========================================================
// Demographics types
// =========================================================

/// Gender split, integer percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenderDistribution {
    pub male: i64,
    pub female: i64,
}

/// Age-bucket split, integer percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgeDistribution {
    #[serde(rename = "18-24")]
    pub age_18_24: i64,
    #[serde(rename = "25-34")]
    pub age_25_34: i64,
    #[serde(rename = "35-44")]
    pub age_35_44: i64,
}

/// Audience demographics averaged over each book's latest snapshot.
///
/// Values are rounded independently and are not renormalized, so a
/// distribution may sum to 99 or 101.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicsData {
    pub gender_distribution: GenderDistribution,
    pub age_distribution: AgeDistribution,
    /// Number of books that contributed a snapshot.
    pub books_counted: usize,
}
