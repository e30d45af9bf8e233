//! Append-only audit log of notified postings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::format_timestamp;
use crate::utils::fs::{ensure_parent, is_older_than};

/// Audit log writer. One line per notified posting.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `[timestamp] entry`, flattening the entry to one line.
    pub async fn append(&self, entry: &str, now: DateTime<Local>) -> Result<()> {
        ensure_parent(&self.path).await?;
        let line = format!("[{}] {}\n", format_timestamp(now), single_line(entry));

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Truncate the log if it was last written more than `max_age` ago.
    pub async fn rotate_if_stale(&self, max_age: Duration) -> Result<bool> {
        if !is_older_than(&self.path, max_age).await? {
            return Ok(false);
        }
        tokio::fs::File::create(&self.path).await?;
        log::info!("Cleared audit log {}", self.path.display());
        Ok(true)
    }
}

fn single_line(entry: &str) -> String {
    entry
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_one_line_per_entry() {
        let tmp = TempDir::new().unwrap();
        let log = AuditLog::new(tmp.path().join("checked_jobs.log"));
        let now = Local.with_ymd_and_hms(2026, 10, 19, 7, 5, 0).unwrap();

        log.append("NEW: [Tier 1] SWE at Acme\nhttps://x/1", now)
            .await
            .unwrap();
        log.append("NEW: [Tier 2] PM at Initech", now).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "[2026-10-19 07:05:00] NEW: [Tier 1] SWE at Acme | https://x/1"
        );
    }

    #[tokio::test]
    async fn test_rotate_truncates_stale_log() {
        let tmp = TempDir::new().unwrap();
        let log = AuditLog::new(tmp.path().join("checked_jobs.log"));
        std::fs::write(log.path(), "old line\n").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(log.rotate_if_stale(Duration::from_millis(1)).await.unwrap());
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
        assert!(!log.rotate_if_stale(Duration::from_secs(3600)).await.unwrap());
    }
}
