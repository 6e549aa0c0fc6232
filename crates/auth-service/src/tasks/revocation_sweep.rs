//! Revocation sweep background task.
//!
//! A revoked token whose own `exp` has passed is rejected as expired before
//! the store is consulted, so its entry can go. The sweep deletes those rows
//! on a fixed interval to keep the table bounded.
//!
//! # Graceful Shutdown
//!
//! The task exits when the cancellation token is triggered. A sweep already
//! in progress finishes first.

use crate::config::DEFAULT_REVOCATION_SWEEP_INTERVAL_SECONDS;
use crate::observability::metrics::record_revocation_sweep;
use crate::repositories::RevocationRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Configuration for the revocation sweep task.
#[derive(Debug, Clone)]
pub struct RevocationSweepConfig {
    pub interval_seconds: u64,
}

impl Default for RevocationSweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_REVOCATION_SWEEP_INTERVAL_SECONDS,
        }
    }
}

impl RevocationSweepConfig {
    /// `None` when `interval_seconds` is 0, meaning the sweep is disabled.
    pub fn from_interval(interval_seconds: u64) -> Option<Self> {
        (interval_seconds > 0).then_some(Self { interval_seconds })
    }
}

/// Run the sweep loop until `cancel_token` fires.
///
/// The first sweep runs immediately on start.
#[instrument(skip_all, name = "auth.task.revocation_sweep")]
pub async fn start_revocation_sweep(
    revocations: Arc<dyn RevocationRepository>,
    config: RevocationSweepConfig,
    cancel_token: CancellationToken,
) {
    info!(
        target: "auth.task.revocation_sweep",
        interval_seconds = config.interval_seconds,
        "Starting revocation sweep task"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_seconds));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_sweep(revocations.as_ref(), Utc::now()).await;
            }
            _ = cancel_token.cancelled() => {
                info!(
                    target: "auth.task.revocation_sweep",
                    "Revocation sweep task received shutdown signal, exiting"
                );
                break;
            }
        }
    }

    info!(target: "auth.task.revocation_sweep", "Revocation sweep task stopped");
}

/// Run a single sweep. Returns the number of entries removed; failures are
/// logged and counted as zero so the loop keeps going.
pub(crate) async fn run_sweep(revocations: &dyn RevocationRepository, now: DateTime<Utc>) -> u64 {
    match revocations.delete_expired(now).await {
        Ok(deleted) => {
            record_revocation_sweep("success", deleted);
            if deleted > 0 {
                info!(
                    target: "auth.task.revocation_sweep",
                    deleted_count = deleted,
                    "Pruned expired revocation entries"
                );
            }
            deleted
        }
        Err(e) => {
            record_revocation_sweep("error", 0);
            tracing::error!(
                target: "auth.task.revocation_sweep",
                error = %e,
                "Failed to prune revocation entries"
            );
            0
        }
    }
}
