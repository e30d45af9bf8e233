//! Store inspection.

use std::time::Duration;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::storage::{LocalStorage, SeenStorage};
use crate::utils::fs::file_age;
use crate::utils::log::summary;

/// Snapshot of the dedup store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreInfo {
    pub records: usize,
    pub unknown_timestamps: usize,
    pub oldest: Option<NaiveDateTime>,
    pub newest: Option<NaiveDateTime>,
    /// Time since the store file was last written; `None` if absent
    pub file_age: Option<Duration>,
}

/// Describe the store at `storage` without modifying it.
pub async fn run_info(storage: &LocalStorage) -> Result<StoreInfo> {
    let seen = storage.load().await?;
    let stamps: Vec<NaiveDateTime> = seen.iter().filter_map(|(_, r)| r.created_at()).collect();

    let info = StoreInfo {
        records: seen.len(),
        unknown_timestamps: seen
            .iter()
            .filter(|(_, r)| r.has_unknown_timestamp())
            .count(),
        oldest: stamps.iter().min().copied(),
        newest: stamps.iter().max().copied(),
        file_age: file_age(storage.path()).await?,
    };

    let show = |t: Option<NaiveDateTime>| t.map_or_else(|| "-".to_string(), |t| t.to_string());
    summary(
        &format!("Store {}", storage.location()),
        &[
            ("Records", info.records.to_string()),
            ("Unknown timestamps", info.unknown_timestamps.to_string()),
            ("Oldest", show(info.oldest)),
            ("Newest", show(info.newest)),
            (
                "Last written",
                info.file_age.map_or_else(
                    || "never".to_string(),
                    |age| format!("{}m ago", age.as_secs() / 60),
                ),
            ),
        ],
    );

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_info_on_missing_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path().join("seen.json"));

        let info = run_info(&store).await.unwrap();
        assert_eq!(info, StoreInfo::default());
    }

    #[tokio::test]
    async fn test_info_range() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path().join("seen.json"));
        std::fs::write(
            store.path(),
            r#"{
                "a": {"timestamp": "2026-10-18 09:00:00", "company": "Acme"},
                "b": {"timestamp": "2026-10-19 07:30:00", "company": "Initech"},
                "c": {"timestamp": "unknown"}
            }"#,
        )
        .unwrap();

        let info = run_info(&store).await.unwrap();
        assert_eq!(info.records, 3);
        assert_eq!(info.unknown_timestamps, 1);
        assert_eq!(info.oldest.unwrap().to_string(), "2026-10-18 09:00:00");
        assert_eq!(info.newest.unwrap().to_string(), "2026-10-19 07:30:00");
        assert!(info.file_age.is_some());
    }
}
