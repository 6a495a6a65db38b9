//! Duplicate signal suppression.
//!
//! TradingView fires one alert per bar condition, but network retries
//! and copy-pasted alert configurations can deliver the same signal
//! twice in quick succession. The tracker remembers recently accepted
//! `(symbol, action)` pairs and flags repeats inside the window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use model::TradeAction;
use parking_lot::Mutex;

/// How long an accepted signal suppresses identical follow-ups.
pub const DEDUP_WINDOW: Duration = Duration::from_secs(60);

/// Map size that triggers an opportunistic prune of expired entries.
const PRUNE_THRESHOLD: usize = 100;

/// Tracks recently accepted signals keyed by symbol and action.
pub struct SignalTracker {
    window: Duration,
    prune_threshold: usize,
    seen: Mutex<HashMap<(String, TradeAction), Instant>>,
}

impl SignalTracker {
    /// Create a tracker with the default window and prune threshold.
    pub fn new() -> Self {
        Self::with_settings(DEDUP_WINDOW, PRUNE_THRESHOLD)
    }

    /// Create a tracker with explicit settings.
    pub fn with_settings(window: Duration, prune_threshold: usize) -> Self {
        Self {
            window,
            prune_threshold,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record a signal, reporting whether it duplicates one accepted
    /// inside the window.
    ///
    /// The window runs from the last accepted signal; rejected repeats
    /// do not extend it.
    pub fn check_and_record(&self, symbol: &str, action: TradeAction) -> bool {
        let now = Instant::now();
        let mut seen = self.seen.lock();

        if seen.len() > self.prune_threshold {
            let window = self.window;
            seen.retain(|_, accepted_at| now.duration_since(*accepted_at) < window);
        }

        let key = (symbol.to_string(), action);
        if let Some(accepted_at) = seen.get(&key) {
            if now.duration_since(*accepted_at) < self.window {
                return true;
            }
        }

        seen.insert(key, now);
        false
    }

    /// Number of tracked entries, expired ones included.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

impl Default for SignalTracker {
    fn default() -> Self {
        Self::new()
    }
}
