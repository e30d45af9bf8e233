//! Service layer for the watcher.
//!
//! This module contains the business logic for:
//! - Company matching (`CompanyMatcher`)
//! - Listing sources (`SourceAdapter` implementations)
//! - Notification delivery (`Notifier` implementations)

mod matcher;
mod notifier;
pub mod sources;

pub use matcher::{CompanyMatcher, CompanyRule};
pub use notifier::{DisabledNotifier, Notifier, TelegramNotifier, build_notifier};
pub use sources::{SourceAdapter, build_source};
