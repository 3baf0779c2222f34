//! In-memory record store for tests and local development.
//!
//! Understands the comparison dialect subset `(field,eq,value)` and
//! `(field,neq,value)`, with clauses joined by `~and`. Array fields (linked
//! records, lookups) match when any element equals the value.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::db::repository::{
    ErrorContext, FilterDialect, ListQuery, RecordStore, RepositoryError, RepositoryResult,
    SortDirection, SortSpec,
};
use crate::models::record::{value_as_number, value_as_text, value_as_text_list};
use crate::models::Record;

#[derive(Debug, Default)]
struct LocalData {
    collections: HashMap<String, Vec<Record>>,
}

/// In-memory store. Cloning shares the underlying data.
#[derive(Debug, Clone)]
pub struct LocalStore {
    data: Arc<RwLock<LocalData>>,
    healthy: Arc<RwLock<bool>>,
}

impl LocalStore {
    /// Create an empty, healthy store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            healthy: Arc::new(RwLock::new(true)),
        }
    }

    /// Builder-style seeding.
    pub fn with_records(self, collection: &str, records: impl IntoIterator<Item = Record>) -> Self {
        self.insert_many(collection, records);
        self
    }

    /// Append a record to a collection, replacing any record with the same id.
    pub fn insert(&self, collection: &str, record: Record) {
        let mut data = self.data.write();
        let rows = data.collections.entry(collection.to_string()).or_default();
        match rows.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => rows.push(record),
        }
    }

    pub fn insert_many(&self, collection: &str, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.insert(collection, record);
        }
    }

    /// Number of records stored in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.data
            .read()
            .collections
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().collections.values().all(Vec::is_empty)
    }

    pub fn clear(&self) {
        self.data.write().collections.clear();
    }

    /// Simulate an outage: while unhealthy every call fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.write() = healthy;
    }

    fn check_health(&self, context: ErrorContext) -> RepositoryResult<()> {
        if *self.healthy.read() {
            Ok(())
        } else {
            Err(RepositoryError::ConnectionError {
                message: "Local store is unavailable".to_string(),
                context: context.retryable(),
                source: None,
            })
        }
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    fn dialect(&self) -> FilterDialect {
        FilterDialect::Comparison
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.check_health(ErrorContext::new("health_check"))?;
        Ok(true)
    }

    async fn fetch_all(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> RepositoryResult<Vec<Record>> {
        let context = ErrorContext::new("fetch_all").with_collection(collection);
        self.check_health(context.clone())?;

        let clauses = match query.filter.as_deref() {
            Some(filter) => parse_filter(filter)
                .map_err(|msg| RepositoryError::query_with_context(msg, context.clone()))?,
            None => Vec::new(),
        };

        let mut rows: Vec<Record> = {
            let data = self.data.read();
            data.collections
                .get(collection)
                .map(|rows| {
                    rows.iter()
                        .filter(|r| clauses.iter().all(|c| c.matches(r)))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if !query.sort.is_empty() {
            rows.sort_by(|a, b| compare_records(a, b, &query.sort));
        }
        if let Some(max) = query.max_records {
            rows.truncate(max);
        }

        debug!(
            "local fetch_all collection={} filter={:?} -> {} records",
            collection,
            query.filter,
            rows.len()
        );
        Ok(rows)
    }

    async fn fetch_one_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> RepositoryResult<Option<Record>> {
        self.check_health(
            ErrorContext::new("fetch_one_by_id")
                .with_collection(collection)
                .with_record_id(id),
        )?;
        let data = self.data.read();
        Ok(data
            .collections
            .get(collection)
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned())
    }
}

// =============================================================================
// Filter evaluation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Eq,
    Neq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    field: String,
    op: Op,
    value: String,
}

impl Clause {
    fn matches(&self, record: &Record) -> bool {
        let hit = record
            .get(&self.field)
            .map(|v| field_equals(v, &self.value))
            .unwrap_or(false);
        match self.op {
            Op::Eq => hit,
            Op::Neq => !hit,
        }
    }
}

fn field_equals(value: &Value, expected: &str) -> bool {
    match value {
        Value::Bool(b) => expected.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
        Value::Number(_) => match (value_as_number(value), expected.trim().parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        Value::Array(_) => value_as_text_list(value).iter().any(|v| v == expected),
        other => value_as_text(other).map(|v| v == expected).unwrap_or(false),
    }
}

fn parse_filter(filter: &str) -> Result<Vec<Clause>, String> {
    filter.split("~and").map(parse_clause).collect()
}

fn parse_clause(raw: &str) -> Result<Clause, String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| format!("Malformed filter clause: {}", trimmed))?;

    let mut parts = inner.splitn(3, ',');
    let field = parts.next().map(str::trim).unwrap_or_default();
    let op = parts.next().map(str::trim).unwrap_or_default();
    let value = parts
        .next()
        .ok_or_else(|| format!("Malformed filter clause: {}", trimmed))?;

    if field.is_empty() {
        return Err(format!("Filter clause without field: {}", trimmed));
    }
    let op = match op {
        "eq" => Op::Eq,
        "neq" => Op::Neq,
        other => return Err(format!("Unsupported filter operator: {}", other)),
    };

    Ok(Clause {
        field: field.to_string(),
        op,
        value: value.to_string(),
    })
}

// =============================================================================
// Sorting
// =============================================================================

fn compare_records(a: &Record, b: &Record, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let ord = compare_values(a.get(&spec.field), b.get(&spec.field));
        let ord = match spec.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Missing values sort first; numbers compare numerically, everything else as text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (value_as_number(a), value_as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => value_as_text(a)
                .unwrap_or_default()
                .cmp(&value_as_text(b).unwrap_or_default()),
        },
    }
}
