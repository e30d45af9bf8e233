//! Backfill of unknown timestamps in the dedup store.

use chrono::Local;

use crate::error::Result;
use crate::storage::SeenStorage;

/// Replace every `"unknown"` timestamp with the current time and persist.
///
/// Unlike a normal run, a store that cannot be read is an error here:
/// overwriting it would lose the records this command exists to fix.
pub async fn run_repair(storage: &dyn SeenStorage) -> Result<usize> {
    let mut seen = storage.load().await?;
    let fixed = seen.backfill_timestamps(Local::now());

    if fixed == 0 {
        log::info!("No unknown timestamps in {}", storage.location());
        return Ok(0);
    }

    storage.persist(&seen).await?;
    log::info!(
        "Fixed {} of {} timestamps in {}",
        fixed,
        seen.len(),
        storage.location()
    );
    Ok(fixed)
}
