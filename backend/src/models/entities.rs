//! Typed views over the dashboard collections.
//!
//! Each entity keeps the handful of fields the aggregators read in plain
//! struct fields and moves everything else into an `extra` side map, so a
//! record can be handed back to callers without losing any column.
//! [`Book::field`] and friends look up a field by its wire name, falling back
//! to the side map for columns the struct does not model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{
    value_as_flag, value_as_number, value_as_text, value_as_text_list, FieldMap, Record,
};
use super::time::parse_date_value;
use crate::define_id_type;

define_id_type!(BookId);
define_id_type!(AuthorId);
define_id_type!(ClientId);

/// Wire names of the columns the aggregators understand.
///
/// Some columns exist under two spellings depending on the backend
/// (`Is Active` on the formula store, `is_active` on the comparison store);
/// both are accepted.
pub mod fields {
    pub const TITLE: &str = "Title";
    pub const UPLOAD_DATE: &[&str] = &["upload_date", "Upload Date"];
    pub const IS_ACTIVE: &[&str] = &["is_active", "Is Active"];
    pub const CLIENT: &str = "Client";
    pub const CLIENT_EMAIL: &str = "Client Email";
    pub const PLATFORM: &str = "Platform";
    pub const AUTHOR: &str = "Author";
    pub const AUTHOR_NAME: &str = "Author Name";
    pub const TOTAL_REVENUES: &str = "Total Revenues";
    pub const TOTAL_LISTENING_MINUTES: &str = "Total Listening Minutes";

    pub const RECORD_DATE: &str = "Record Date";
    pub const BOOK: &str = "Book";
    pub const REVENUE: &str = "Revenue";
    pub const STAR_RATING: &str = "5-star Rate";
    pub const MALE_SHARE: &str = "Male Share";
    pub const FEMALE_SHARE: &str = "Female Share";
    pub const AGE_18_24_SHARE: &str = "( 18 - 24 ) Share";
    pub const AGE_25_34_SHARE: &str = "( 25 - 34 ) Share";
    pub const AGE_35_44_SHARE: &str = "( 35 - 44 ) Share";

    pub const INVOICE_ID: &str = "Invoice ID";
    pub const INVOICE_AMOUNT: &str = "Invoice Amount";
    pub const IS_PAID: &str = "Is Paid";
    pub const PAYMENT_DATE: &str = "Payment Date";

    pub const NOTE_ID: &str = "Note ID";

    pub const CLIENT_NAME: &[&str] = &["client_name", "Client Name"];
    pub const EMAIL: &[&str] = &["email", "Contact Email"];
    pub const CLIENT_SECRETS: &[&str] = &["password", "Password"];
}

fn take(map: &mut FieldMap, name: &str) -> Option<Value> {
    map.remove(name)
}

/// Remove every alias of a column, keeping the first present value.
fn take_any(map: &mut FieldMap, names: &[&str]) -> Option<Value> {
    let mut found = None;
    for name in names {
        if let Some(v) = map.remove(*name) {
            found.get_or_insert(v);
        }
    }
    found
}

fn number_of(value: Option<Value>) -> f64 {
    value.as_ref().and_then(value_as_number).unwrap_or(0.0)
}

fn text_of(value: Option<Value>) -> Option<String> {
    value.as_ref().and_then(value_as_text)
}

fn flag_of(value: Option<Value>) -> bool {
    value.as_ref().map(value_as_flag).unwrap_or(false)
}

fn list_of(value: Option<Value>) -> Vec<String> {
    value.as_ref().map(value_as_text_list).unwrap_or_default()
}

fn date_of(value: &Option<Value>) -> Option<DateTime<Utc>> {
    value.as_ref().and_then(parse_date_value)
}

// =============================================================================
// Book
// =============================================================================

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: Option<String>,
    /// Raw upload date as returned by the store.
    pub upload_date_raw: Option<Value>,
    /// Parsed upload date; `None` when missing or unparsable.
    pub upload_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub client: Vec<String>,
    pub platforms: Vec<String>,
    pub author: Option<AuthorId>,
    pub author_name: Option<String>,
    pub total_revenues: f64,
    pub total_listening_minutes: f64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl Book {
    pub fn from_record(record: Record) -> Self {
        let Record { id, fields: mut map } = record;
        let upload_date_raw = take_any(&mut map, fields::UPLOAD_DATE);
        Self {
            id: BookId(id),
            title: text_of(take(&mut map, fields::TITLE)),
            upload_date: date_of(&upload_date_raw),
            upload_date_raw,
            is_active: flag_of(take_any(&mut map, fields::IS_ACTIVE)),
            client: list_of(take(&mut map, fields::CLIENT)),
            platforms: list_of(take(&mut map, fields::PLATFORM)),
            author: text_of(take(&mut map, fields::AUTHOR)).map(AuthorId),
            author_name: text_of(take(&mut map, fields::AUTHOR_NAME)),
            total_revenues: number_of(take(&mut map, fields::TOTAL_REVENUES)),
            total_listening_minutes: number_of(take(&mut map, fields::TOTAL_LISTENING_MINUTES)),
            extra: map,
        }
    }

    /// Look up a column by wire name, modelled columns first, then the side map.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::TITLE => self.title.clone().map(Value::from),
            fields::CLIENT => Some(Value::from(self.client.clone())),
            fields::PLATFORM => Some(Value::from(self.platforms.clone())),
            fields::AUTHOR => self.author.as_ref().map(|a| Value::from(a.as_str())),
            fields::AUTHOR_NAME => self.author_name.clone().map(Value::from),
            fields::TOTAL_REVENUES => Some(Value::from(self.total_revenues)),
            fields::TOTAL_LISTENING_MINUTES => Some(Value::from(self.total_listening_minutes)),
            n if fields::IS_ACTIVE.contains(&n) => Some(Value::from(self.is_active)),
            n if fields::UPLOAD_DATE.contains(&n) => self.upload_date_raw.clone(),
            other => self.extra.get(other).cloned(),
        }
    }
}

// =============================================================================
// PerformanceSnapshot
// =============================================================================

/// One dated performance observation of one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub id: String,
    /// Parsed record date; `None` when missing or unparsable.
    pub record_date: Option<DateTime<Utc>>,
    pub book: Option<BookId>,
    pub revenue: f64,
    pub listening_minutes: f64,
    /// 1–5 stars; 0 means "no rating".
    pub rating: f64,
    pub male_share: f64,
    pub female_share: f64,
    pub age_18_24_share: f64,
    pub age_25_34_share: f64,
    pub age_35_44_share: f64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl PerformanceSnapshot {
    pub fn from_record(record: Record) -> Self {
        let Record { id, fields: mut map } = record;
        let record_date = take(&mut map, fields::RECORD_DATE);
        let record_date_parsed = date_of(&record_date);
        if let Some(raw) = record_date {
            // keep the raw column for callers that render it verbatim
            map.insert(fields::RECORD_DATE.to_string(), raw);
        }
        Self {
            id,
            record_date: record_date_parsed,
            book: text_of(take(&mut map, fields::BOOK)).map(BookId),
            revenue: number_of(take(&mut map, fields::REVENUE)),
            listening_minutes: number_of(take(&mut map, fields::TOTAL_LISTENING_MINUTES)),
            rating: number_of(take(&mut map, fields::STAR_RATING)),
            male_share: number_of(take(&mut map, fields::MALE_SHARE)),
            female_share: number_of(take(&mut map, fields::FEMALE_SHARE)),
            age_18_24_share: number_of(take(&mut map, fields::AGE_18_24_SHARE)),
            age_25_34_share: number_of(take(&mut map, fields::AGE_25_34_SHARE)),
            age_35_44_share: number_of(take(&mut map, fields::AGE_35_44_SHARE)),
            extra: map,
        }
    }

    pub fn has_rating(&self) -> bool {
        self.rating > 0.0
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::BOOK => self.book.as_ref().map(|b| Value::from(b.as_str())),
            fields::REVENUE => Some(Value::from(self.revenue)),
            fields::TOTAL_LISTENING_MINUTES => Some(Value::from(self.listening_minutes)),
            fields::STAR_RATING => Some(Value::from(self.rating)),
            fields::MALE_SHARE => Some(Value::from(self.male_share)),
            fields::FEMALE_SHARE => Some(Value::from(self.female_share)),
            fields::AGE_18_24_SHARE => Some(Value::from(self.age_18_24_share)),
            fields::AGE_25_34_SHARE => Some(Value::from(self.age_25_34_share)),
            fields::AGE_35_44_SHARE => Some(Value::from(self.age_35_44_share)),
            other => self.extra.get(other).cloned(),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A billing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: Option<String>,
    pub amount: f64,
    pub is_paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
    pub client: Vec<String>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl Invoice {
    pub fn from_record(record: Record) -> Self {
        let Record { id, fields: mut map } = record;
        let payment_date = take(&mut map, fields::PAYMENT_DATE);
        let payment_date_parsed = date_of(&payment_date);
        if let Some(raw) = payment_date {
            map.insert(fields::PAYMENT_DATE.to_string(), raw);
        }
        Self {
            id,
            invoice_number: text_of(take(&mut map, fields::INVOICE_ID)),
            amount: number_of(take(&mut map, fields::INVOICE_AMOUNT)),
            is_paid: flag_of(take(&mut map, fields::IS_PAID)),
            payment_date: payment_date_parsed,
            client: list_of(take(&mut map, fields::CLIENT)),
            extra: map,
        }
    }
}

// =============================================================================
// Note
// =============================================================================

/// Free-form annotation attached to books or snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub note_number: Option<f64>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl Note {
    pub fn from_record(record: Record) -> Self {
        let Record { id, fields: mut map } = record;
        Self {
            id,
            note_number: take(&mut map, fields::NOTE_ID)
                .as_ref()
                .and_then(value_as_number),
            extra: map,
        }
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::NOTE_ID => self.note_number.map(Value::from),
            other => self.extra.get(other).cloned(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// A client account. Credential columns are discarded on read; every other
/// column is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl Client {
    pub fn from_record(record: Record) -> Self {
        let Record { id, fields: mut map } = record;
        for secret in fields::CLIENT_SECRETS {
            map.remove(*secret);
        }
        Self {
            id: ClientId(id),
            name: text_of(take_any(&mut map, fields::CLIENT_NAME)),
            email: text_of(take_any(&mut map, fields::EMAIL)),
            extra: map,
        }
    }
}
