//! Pipeline entry points for watcher operations.
//!
//! - `run_watch`: Fetch, filter, notify and persist once
//! - `run_repair`: Backfill unknown timestamps in the store
//! - `run_validate`: Check configuration and the company list
//! - `run_info`: Describe the store

pub mod filter;
pub mod info;
pub mod repair;
pub mod run;
pub mod validate;

pub use filter::{Accepted, Decision, decide, filter_new};
pub use info::{StoreInfo, run_info};
pub use repair::run_repair;
pub use run::{RunOptions, RunPhase, Watcher, run_watch};
pub use validate::{ValidationSummary, run_validate};
