//! Query parameters shared by every record store.
//!
//! Filters are opaque strings handed to the backend untouched. Callers that
//! need to build one without knowing which backend is active go through
//! [`FilterDialect`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{ErrorContext, RepositoryError, RepositoryResult};

/// Largest page most hosted table backends will serve.
pub const MAX_PAGE_SIZE: usize = 100;

/// Characters that delimit clauses in the comparison dialect.
pub const COMPARISON_RESERVED: [char; 4] = ['(', ')', ',', '~'];

/// Sort direction for a [`SortSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// One sort key. Backends apply keys in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parameters of a `fetch_all` call.
///
/// `page_size` is a hint clamped to `1..=MAX_PAGE_SIZE`; `max_records` caps the
/// total number of records returned. With no cap every matching record is
/// returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub sort: Vec<SortSpec>,
    pub page_size: Option<usize>,
    pub max_records: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter. An empty string means "no filter".
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.trim().is_empty() {
            None
        } else {
            Some(filter)
        };
        self
    }

    pub fn filter_opt(self, filter: Option<String>) -> Self {
        match filter {
            Some(f) => self.filter(f),
            None => self,
        }
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort.push(spec);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    /// Page size actually sent to the backend.
    pub fn effective_page_size(&self, default: usize) -> usize {
        let size = self.page_size.unwrap_or(default);
        size.clamp(1, MAX_PAGE_SIZE)
    }

    /// How many records the next page may still contribute.
    pub fn remaining(&self, fetched: usize) -> Option<usize> {
        self.max_records.map(|max| max.saturating_sub(fetched))
    }
}

/// Filter language understood by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDialect {
    /// Spreadsheet-style formula: `({Field} = 'value')`.
    Formula,
    /// Comparison tuple: `(field,eq,value)`, clauses joined with `~and`.
    Comparison,
}

impl FilterDialect {
    /// Equality predicate on `field`.
    ///
    /// # Errors
    /// `InvalidInput` when a comparison-dialect value contains one of
    /// [`COMPARISON_RESERVED`]; that dialect has no escape syntax.
    pub fn equals(&self, field: &str, value: &str) -> RepositoryResult<String> {
        match self {
            FilterDialect::Formula => {
                Ok(format!("({{{}}} = '{}')", field, escape_formula(value)))
            }
            FilterDialect::Comparison => {
                if let Some(c) = value.chars().find(|c| COMPARISON_RESERVED.contains(c)) {
                    return Err(RepositoryError::invalid_input(
                        format!("'{}' cannot be used in a filter value", c),
                        ErrorContext::new("render_filter").with_details(field),
                    ));
                }
                Ok(format!("({},eq,{})", field, value))
            }
        }
    }

    /// Conjunction of already rendered predicates.
    pub fn all_of<I, S>(&self, clauses: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let clauses: Vec<String> = clauses
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        match (self, clauses.len()) {
            (_, 0) => String::new(),
            (_, 1) => clauses.into_iter().next().unwrap_or_default(),
            (FilterDialect::Formula, _) => format!("AND({})", clauses.join(", ")),
            (FilterDialect::Comparison, _) => clauses.join("~and"),
        }
    }
}

fn escape_formula(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
