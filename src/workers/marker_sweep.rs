//! Reclaims expired session markers, presence markers and daily buckets.
//! Reads already ignore expired entries; this only frees the space.

use crate::constants::MAX_SWEEP_REMOVALS;
use crate::store::Store;

pub async fn run(store: &Store) {
    tracing::debug!("marker_sweep: start");
    match store.purge_expired(MAX_SWEEP_REMOVALS) {
        Ok(removed) if removed >= MAX_SWEEP_REMOVALS => tracing::info!(
            removed,
            "marker_sweep: reached single-run limit, remaining entries deferred to next run"
        ),
        Ok(removed) => tracing::info!(removed, "marker_sweep: done"),
        Err(e) => tracing::error!(error = %e, "marker_sweep failed"),
    }
}
