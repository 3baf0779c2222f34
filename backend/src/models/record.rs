//! Generic record shape shared by every record-store backend.
//!
//! A record is an identifier plus an open map of named fields. Field names are
//! kept byte-for-byte (spaces, punctuation and non-ASCII names included) and
//! no field is ever dropped on read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map type used for record payloads and entity side maps.
pub type FieldMap = Map<String, Value>;

/// A single row read from a collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Backend identifier, stable and unique within its collection.
    pub id: String,
    /// Every field the backend returned, keyed by its exact name.
    #[serde(default)]
    pub fields: FieldMap,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object literal (mainly for fixtures).
    ///
    /// Non-object values produce a record without fields.
    pub fn from_json(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, fields)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(value_as_number)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(value_as_text)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).map(value_as_flag).unwrap_or(false)
    }
}

/// Interpret a field value as a number.
///
/// Single-element arrays (lookup fields) are unwrapped; numeric strings are
/// parsed. Anything else is `None`.
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Array(items) if items.len() == 1 => value_as_number(&items[0]),
        _ => None,
    }
}

/// Interpret a field value as text. Arrays yield their first textual element.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(value_as_text),
        _ => None,
    }
}

/// Interpret a checkbox-like value. Absent, null and unknown shapes are `false`.
pub fn value_as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        Value::Array(items) if items.len() == 1 => value_as_flag(&items[0]),
        _ => false,
    }
}

/// Interpret a value as a list of strings (linked records, multi-selects).
pub fn value_as_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_as_text).collect(),
        Value::Null => Vec::new(),
        other => value_as_text(other).into_iter().collect(),
    }
}
