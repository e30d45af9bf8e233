//! Storage for the dedup store and the audit log.
//!
//! ## Layout
//!
//! ```text
//! data/
//! ├── config.toml           # Watcher configuration
//! ├── companies.txt         # name|tier rules
//! ├── seen.json             # Dedup store: id -> SeenRecord
//! └── checked_jobs.log      # Audit log, one line per notified posting
//! ```

pub mod audit;
pub mod local;
pub mod migrate;

use std::collections::HashMap;
use std::collections::hash_map;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::Result;
use crate::models::{PostingId, SeenRecord, format_timestamp};

// Re-export for convenience
pub use audit::AuditLog;
pub use local::LocalStorage;
pub use migrate::legacy_to_current;

/// In-memory view of the dedup store for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    records: HashMap<PostingId, SeenRecord>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` was already notified.
    pub fn has(&self, id: &PostingId) -> bool {
        self.records.contains_key(id)
    }

    /// Insert or overwrite the record for `id`.
    pub fn record(&mut self, id: PostingId, record: SeenRecord) {
        self.records.insert(id, record);
    }

    pub fn get(&self, id: &PostingId) -> Option<&SeenRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, PostingId, SeenRecord> {
        self.records.iter()
    }

    /// Replace every unknown timestamp with `now`, keeping all other fields.
    ///
    /// Returns the number of records changed.
    pub fn backfill_timestamps(&mut self, now: DateTime<Local>) -> usize {
        let stamp = format_timestamp(now);
        let mut fixed = 0;
        for record in self.records.values_mut() {
            if record.has_unknown_timestamp() {
                record.timestamp = stamp.clone();
                fixed += 1;
            }
        }
        fixed
    }

    /// Records sorted by key, for stable serialization.
    pub fn sorted(&self) -> Vec<(&PostingId, &SeenRecord)> {
        let mut entries: Vec<_> = self.records.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl From<HashMap<PostingId, SeenRecord>> for SeenSet {
    fn from(records: HashMap<PostingId, SeenRecord>) -> Self {
        Self { records }
    }
}

/// Trait for dedup store backends.
#[async_trait]
pub trait SeenStorage: Send + Sync {
    /// Read the persisted store, upgrading legacy encodings.
    ///
    /// A missing store is empty. A corrupt store is an error; callers
    /// decide whether to degrade.
    async fn load(&self) -> Result<SeenSet>;

    /// Overwrite the persisted store with `seen`.
    async fn persist(&self, seen: &SeenSet) -> Result<()>;

    /// Clear the whole store if it was last written more than `max_age` ago.
    ///
    /// Returns whether the store was cleared.
    async fn expire_if_stale(&self, max_age: Duration) -> Result<bool>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// Load the store, treating a corrupt store as empty.
///
/// Previously seen postings may be notified again in that case; the
/// corruption is logged.
pub async fn load_or_empty(storage: &dyn SeenStorage) -> SeenSet {
    match storage.load().await {
        Ok(seen) => seen,
        Err(e) => {
            log::warn!(
                "Could not load dedup store {}: {}. Starting from an empty store.",
                storage.location(),
                e
            );
            SeenSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_TIMESTAMP;
    use chrono::TimeZone;

    #[test]
    fn test_record_is_last_write_wins() {
        let mut seen = SeenSet::new();
        let id = PostingId::from("https://x/1");
        seen.record(id.clone(), SeenRecord::placeholder(&id));

        let mut newer = SeenRecord::placeholder(&id);
        newer.company = "Acme".into();
        seen.record(id.clone(), newer);

        assert!(seen.has(&id));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen.get(&id).unwrap().company, "Acme");
    }

    #[test]
    fn test_backfill_only_touches_unknown() {
        let mut seen = SeenSet::new();
        let a = PostingId::from("a");
        let b = PostingId::from("b");
        seen.record(a.clone(), SeenRecord::placeholder(&a));
        let mut known = SeenRecord::placeholder(&b);
        known.timestamp = "2025-01-01 00:00:00".into();
        known.company = "Acme".into();
        seen.record(b.clone(), known);

        let now = Local.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        assert_eq!(seen.backfill_timestamps(now), 1);
        assert_eq!(seen.get(&a).unwrap().timestamp, "2026-10-19 08:00:00");
        assert_eq!(seen.get(&b).unwrap().timestamp, "2025-01-01 00:00:00");
        assert_eq!(seen.get(&b).unwrap().company, "Acme");
        assert!(seen.iter().all(|(_, r)| r.timestamp != UNKNOWN_TIMESTAMP));
    }

    #[test]
    fn test_sorted_orders_keys() {
        let mut seen = SeenSet::new();
        for key in ["c", "a", "b"] {
            let id = PostingId::from(key);
            seen.record(id.clone(), SeenRecord::placeholder(&id));
        }
        let keys: Vec<_> = seen.sorted().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
