// src/pipeline/run.rs

//! One pass of the watcher: fetch, filter, notify, persist.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::Local;

use crate::error::Result;
use crate::models::{Config, IdentifierPolicy, RunReport};
use crate::services::{CompanyMatcher, Notifier, SourceAdapter, build_notifier, build_source};
use crate::storage::{AuditLog, LocalStorage, SeenStorage, load_or_empty};
use crate::utils::http;
use crate::utils::log::{header, summary};

use super::filter::{Accepted, filter_new};

/// Where a run currently is. Transitions are logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching,
    Filtering,
    Notifying,
    Persisting,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Filtering => "filtering",
            Self::Notifying => "notifying",
            Self::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub identifier: IdentifierPolicy,
    pub template: String,
    /// Clear the store first when older than this
    pub store_max_age: Option<Duration>,
    /// Truncate the audit log first when older than this
    pub audit_rotate_after: Option<Duration>,
    /// Format messages but skip delivery, audit and persistence
    pub dry_run: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self {
            identifier: config.store.identifier,
            template: config.message.template.clone(),
            store_max_age: config.store.max_age(),
            audit_rotate_after: config.audit.rotate_after(),
            dry_run,
        }
    }
}

/// Everything one run needs, wired up.
pub struct Watcher {
    sources: Vec<Box<dyn SourceAdapter>>,
    matcher: CompanyMatcher,
    storage: Box<dyn SeenStorage>,
    notifier: Box<dyn Notifier>,
    audit: AuditLog,
    options: RunOptions,
    phase: RunPhase,
}

impl Watcher {
    pub fn new(
        sources: Vec<Box<dyn SourceAdapter>>,
        matcher: CompanyMatcher,
        storage: Box<dyn SeenStorage>,
        notifier: Box<dyn Notifier>,
        audit: AuditLog,
        options: RunOptions,
    ) -> Self {
        Self {
            sources,
            matcher,
            storage,
            notifier,
            audit,
            options,
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn enter(&mut self, next: RunPhase) {
        log::debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Execute one full pass.
    ///
    /// Source, notifier and store-load failures are logged and absorbed.
    /// Only a failure to persist the store is returned as an error.
    pub async fn run(&mut self) -> Result<RunReport> {
        let mut report = RunReport::default();

        if !self.options.dry_run {
            self.expire_stale(&mut report).await;
        }
        let mut seen = load_or_empty(self.storage.as_ref()).await;
        log::info!(
            "Loaded {} seen postings from {}",
            seen.len(),
            self.storage.location()
        );
        if self.matcher.is_empty() {
            log::warn!("No company rules loaded, every posting will be filtered out");
        }

        self.enter(RunPhase::Fetching);
        let mut postings = Vec::new();
        for source in &self.sources {
            match source.fetch().await {
                Ok(found) => {
                    log::info!("{}: {} postings", source.name(), found.len());
                    postings.extend(found);
                }
                Err(e) => {
                    log::warn!("Skipping source {}: {}", source.name(), e);
                    report.source_failures += 1;
                }
            }
        }
        report.fetched = postings.len();

        self.enter(RunPhase::Filtering);
        let accepted = filter_new(
            postings,
            &mut seen,
            &self.matcher,
            self.options.identifier,
            Local::now(),
            &mut report,
        );

        self.enter(RunPhase::Notifying);
        for item in &accepted {
            self.deliver(item, &mut report).await;
        }

        self.enter(RunPhase::Persisting);
        report.store_size = seen.len();
        if self.options.dry_run {
            log::info!("Dry run, store not written");
        } else if let Err(e) = self.storage.persist(&seen).await {
            self.enter(RunPhase::Idle);
            log::error!("Failed to save {}: {}", self.storage.location(), e);
            return Err(e);
        }

        self.enter(RunPhase::Idle);
        log_report(&report);
        Ok(report)
    }

    async fn expire_stale(&self, report: &mut RunReport) {
        if let Some(max_age) = self.options.store_max_age {
            match self.storage.expire_if_stale(max_age).await {
                Ok(cleared) => report.store_expired = cleared,
                Err(e) => log::warn!("Could not check store age: {e}"),
            }
        }
        if let Some(max_age) = self.options.audit_rotate_after {
            if let Err(e) = self.audit.rotate_if_stale(max_age).await {
                log::warn!("Could not rotate audit log: {e}");
            }
        }
    }

    async fn deliver(&self, item: &Accepted, report: &mut RunReport) {
        let message = item.posting.format(&self.options.template, &item.tier);
        report.notified += 1;

        if self.options.dry_run {
            log::info!("(dry run) {}", message.replace('\n', " | "));
            return;
        }

        let sent = match self.notifier.notify(&message).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Notification for {} failed: {}", item.id, e);
                false
            }
        };
        if !sent {
            report.notify_failures += 1;
        }
        log::info!("New posting {} (sent: {})", item.id, sent);

        if let Err(e) = self.audit.append(&format!("NEW: {message}"), Local::now()).await {
            log::warn!("Could not write audit log: {e}");
        }
    }
}

fn log_report(report: &RunReport) {
    summary(
        "Run complete",
        &[
            ("Fetched", report.fetched.to_string()),
            ("Duplicates", report.duplicates.to_string()),
            ("Irrelevant", report.irrelevant.to_string()),
            ("Notified", report.notified.to_string()),
            ("Notify failures", report.notify_failures.to_string()),
            ("Source failures", report.source_failures.to_string()),
            ("Store size", report.store_size.to_string()),
            ("Store expired", report.store_expired.to_string()),
        ],
    );
}

/// Build a [`Watcher`] from `config` and run it once.
///
/// Relative paths in the config resolve against `base_path`.
pub async fn run_watch(config: &Config, base_path: &Path, dry_run: bool) -> Result<RunReport> {
    header("jobwatch run");

    let client = http::create_client(&config.http)?;
    let sources = config
        .sources
        .iter()
        .map(|source| build_source(source, client.clone()))
        .collect();
    let matcher = CompanyMatcher::load_or_empty(&config.companies_path(base_path)).await;
    let storage = LocalStorage::new(config.seen_path(base_path));
    let notifier = build_notifier(&config.notifier)?;
    let audit = AuditLog::new(config.audit_log_path(base_path));

    let mut watcher = Watcher::new(
        sources,
        matcher,
        Box::new(storage),
        notifier,
        audit,
        RunOptions::from_config(config, dry_run),
    );
    watcher.run().await
}
