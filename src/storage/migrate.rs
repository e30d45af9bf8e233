//! Upgrade of older dedup store encodings.
//!
//! Encodings found in the wild:
//!
//! - a bare array of identifiers: `["id-1", "id-2"]`
//! - an object of identifier to string: `{"id-1": "id-1"}`
//! - an object of identifier to partial record: `{"id-1": {"timestamp": "unknown"}}`
//! - the current encoding: `{"id-1": {"timestamp", "company", "position", "link"}}`

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{PostingId, SeenRecord};

/// Convert any known store encoding into the current mapping.
///
/// Every identifier in the input yields exactly one record; missing
/// metadata is filled with sentinels and present string fields are kept.
/// Repeated identifiers in a legacy array collapse into one record.
pub fn legacy_to_current(data: Value) -> Result<HashMap<PostingId, SeenRecord>> {
    match data {
        Value::Array(items) => {
            let mut records = HashMap::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(id) => {
                        let id = PostingId::from(id);
                        records.insert(id.clone(), SeenRecord::placeholder(&id));
                    }
                    other => log::warn!("Skipping non-string store entry: {other}"),
                }
            }
            Ok(records)
        }
        Value::Object(entries) => Ok(entries
            .into_iter()
            .map(|(key, value)| {
                let id = PostingId::from(key);
                let record = upgrade_entry(&id, value);
                (id, record)
            })
            .collect()),
        other => Err(AppError::validation(format!(
            "expected an array or object, found {}",
            kind_of(&other)
        ))),
    }
}

fn upgrade_entry(id: &PostingId, value: Value) -> SeenRecord {
    match value {
        Value::Object(fields) => {
            let mut record = SeenRecord::placeholder(id);
            if let Some(timestamp) = string_field(&fields, "timestamp") {
                record.timestamp = timestamp;
            }
            if let Some(company) = string_field(&fields, "company") {
                record.company = company;
            }
            if let Some(position) = string_field(&fields, "position") {
                record.position = position;
            }
            if let Some(link) = string_field(&fields, "link") {
                record.link = link;
            }
            record
        }
        _ => SeenRecord::placeholder(id),
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
