// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;
mod record;
mod source;

// Re-export all public types
pub use config::{
    AuditConfig, CHAT_ID_ENV, Config, HttpConfig, IdentifierPolicy, MessageConfig,
    NotifierConfig, PathsConfig, StoreConfig, TOKEN_ENV,
};
pub use posting::{Posting, PostingId, clean_text};
pub use record::{
    SeenRecord, TIMESTAMP_FORMAT, UNKNOWN_FIELD, UNKNOWN_TIMESTAMP, format_timestamp,
};
pub use source::{
    CsvSourceConfig, GridSourceConfig, HtmlSourceConfig, JsonSourceConfig, SourceConfig,
};

/// Per-run counters, logged as the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunReport {
    /// Postings returned by all sources
    pub fetched: usize,
    /// Postings whose identifier was already in the store
    pub duplicates: usize,
    /// Postings whose company matched no rule
    pub irrelevant: usize,
    /// Postings accepted and handed to the notifier
    pub notified: usize,
    /// Accepted postings whose delivery failed
    pub notify_failures: usize,
    /// Sources that failed entirely
    pub source_failures: usize,
    /// Records in the store after the run
    pub store_size: usize,
    /// Whether the staleness reset cleared the store this run
    pub store_expired: bool,
}
