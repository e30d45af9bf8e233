//! Persisted dedup record.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::{Posting, PostingId};

/// Timestamp value of records whose creation time is not known.
pub const UNKNOWN_TIMESTAMP: &str = "unknown";

/// Placeholder for company/position of records upgraded from a bare id list.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Format of record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A posting that has already been notified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenRecord {
    /// Local creation time, or [`UNKNOWN_TIMESTAMP`]
    #[serde(default = "unknown_timestamp")]
    pub timestamp: String,

    #[serde(default = "unknown_field")]
    pub company: String,

    #[serde(default = "unknown_field")]
    pub position: String,

    #[serde(default)]
    pub link: String,
}

impl SeenRecord {
    /// Record a posting first seen at `now`.
    pub fn new(posting: &Posting, id: &PostingId, now: DateTime<Local>) -> Self {
        Self {
            timestamp: format_timestamp(now),
            company: posting.company.clone(),
            position: posting.position.clone(),
            link: posting
                .link
                .clone()
                .unwrap_or_else(|| id.as_str().to_string()),
        }
    }

    /// Sentinel record for an identifier with no metadata.
    pub fn placeholder(id: &PostingId) -> Self {
        Self {
            timestamp: unknown_timestamp(),
            company: unknown_field(),
            position: unknown_field(),
            link: id.as_str().to_string(),
        }
    }

    pub fn has_unknown_timestamp(&self) -> bool {
        self.timestamp.trim().is_empty() || self.timestamp == UNKNOWN_TIMESTAMP
    }

    /// Parsed creation time, if known.
    pub fn created_at(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}

pub fn format_timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

fn unknown_timestamp() -> String {
    UNKNOWN_TIMESTAMP.into()
}

fn unknown_field() -> String {
    UNKNOWN_FIELD.into()
}
