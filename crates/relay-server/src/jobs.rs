//! Background maintenance loops.
//!
//! Each job runs on its own spawned task with an independent interval,
//! so a slow brokerage call in one loop never delays another. All loops
//! watch the shutdown channel and exit on the first `true`.

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::state::AppState;

/// How often the token freshness check runs.
const TOKEN_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// How often the instrument catalogs are re-synced.
const CATALOG_RESYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// How often old order logs are pruned.
const LOG_PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Order log retention.
const LOG_RETENTION_DAYS: i64 = 30;

/// Interval for periodic health logging.
const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn every maintenance loop.
pub fn spawn_jobs(state: AppState, shutdown_rx: watch::Receiver<bool>) {
    spawn_token_refresh(state.clone(), shutdown_rx.clone());
    spawn_catalog_resync(state.clone(), shutdown_rx.clone());
    spawn_log_prune(state.clone(), shutdown_rx.clone());
    spawn_health_log(state, shutdown_rx);
}

fn spawn_token_refresh(state: AppState, mut shutdown_rx: watch::Receiver<bool>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_REFRESH_INTERVAL);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if state.tokens.has_pair() && !state.tokens.ensure_valid().await {
                        warn!("Scheduled token refresh failed; a fresh login is required");
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });
}

fn spawn_catalog_resync(state: AppState, mut shutdown_rx: watch::Receiver<bool>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CATALOG_RESYNC_INTERVAL);
        // The first tick completes immediately and startup already synced
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = state.directory.sync().await;
                    if report.failed.is_empty() {
                        info!(
                            instruments = report.total_instruments,
                            "Instrument catalog resync complete"
                        );
                    } else {
                        warn!(
                            failed = ?report.failed,
                            instruments = report.total_instruments,
                            "Instrument catalog resync finished with failures"
                        );
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });
}

fn spawn_log_prune(state: AppState, mut shutdown_rx: watch::Receiver<bool>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LOG_PRUNE_INTERVAL);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let cutoff = Utc::now() - ChronoDuration::days(LOG_RETENTION_DAYS);
                    match state.store.prune_order_logs(cutoff).await {
                        Ok(()) => info!(cutoff = %cutoff, "Order logs pruned"),
                        Err(err) => warn!(error = %err, "Order log prune failed"),
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });
}

fn spawn_health_log(state: AppState, mut shutdown_rx: watch::Receiver<bool>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEALTH_LOG_INTERVAL);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let snapshot = state.metrics.snapshot();
                    info!(
                        signals = snapshot.signals_received,
                        skipped = snapshot.signals_skipped,
                        placed = snapshot.orders_placed,
                        failed = snapshot.orders_failed,
                        instruments = state.directory.len(),
                        token_held = state.tokens.has_pair(),
                        "Health check"
                    );
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });
}
