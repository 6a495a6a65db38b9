//! Thread-safe counters for the relay's observable behavior.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector shared by the handlers and background jobs.
#[derive(Debug)]
pub struct RelayMetrics {
    // Counters
    signals_received: AtomicU64,
    signals_unauthorized: AtomicU64,
    signals_invalid: AtomicU64,
    signals_skipped: AtomicU64,
    orders_placed: AtomicU64,
    orders_failed: AtomicU64,

    // Timestamps
    inner: RwLock<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    start_time: Instant,
    last_signal_time: Option<Instant>,
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self {
            signals_received: AtomicU64::new(0),
            signals_unauthorized: AtomicU64::new(0),
            signals_invalid: AtomicU64::new(0),
            signals_skipped: AtomicU64::new(0),
            orders_placed: AtomicU64::new(0),
            orders_failed: AtomicU64::new(0),
            inner: RwLock::new(MetricsInner {
                start_time: Instant::now(),
                last_signal_time: None,
            }),
        }
    }

    // --- Increment methods ---

    /// An authenticated, well-formed signal arrived.
    pub fn inc_signals_received(&self) {
        self.signals_received.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_signal_time = Some(Instant::now());
    }

    pub fn inc_signals_unauthorized(&self) {
        self.signals_unauthorized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_signals_invalid(&self) {
        self.signals_invalid.fetch_add(1, Ordering::Relaxed);
    }

    /// A signal terminated as a skip (duplicate or gate rejection).
    pub fn inc_signals_skipped(&self) {
        self.signals_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_orders_placed(&self) {
        self.orders_placed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_orders_failed(&self) {
        self.orders_failed.fetch_add(1, Ordering::Relaxed);
    }

    // --- Getter methods ---

    pub fn signals_received(&self) -> u64 {
        self.signals_received.load(Ordering::Relaxed)
    }

    pub fn signals_unauthorized(&self) -> u64 {
        self.signals_unauthorized.load(Ordering::Relaxed)
    }

    pub fn signals_invalid(&self) -> u64 {
        self.signals_invalid.load(Ordering::Relaxed)
    }

    pub fn signals_skipped(&self) -> u64 {
        self.signals_skipped.load(Ordering::Relaxed)
    }

    pub fn orders_placed(&self) -> u64 {
        self.orders_placed.load(Ordering::Relaxed)
    }

    pub fn orders_failed(&self) -> u64 {
        self.orders_failed.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.inner.read().start_time.elapsed().as_secs_f64()
    }

    pub fn secs_since_last_signal(&self) -> Option<f64> {
        self.inner
            .read()
            .last_signal_time
            .map(|t| t.elapsed().as_secs_f64())
    }

    /// Generate a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signals_received: self.signals_received(),
            signals_unauthorized: self.signals_unauthorized(),
            signals_invalid: self.signals_invalid(),
            signals_skipped: self.signals_skipped(),
            orders_placed: self.orders_placed(),
            orders_failed: self.orders_failed(),
            uptime_secs: self.uptime_secs(),
            secs_since_last_signal: self.secs_since_last_signal(),
        }
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub signals_received: u64,
    pub signals_unauthorized: u64,
    pub signals_invalid: u64,
    pub signals_skipped: u64,
    pub orders_placed: u64,
    pub orders_failed: u64,
    pub uptime_secs: f64,
    pub secs_since_last_signal: Option<f64>,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Relay Metrics ===")?;
        writeln!(f, "Uptime:               {:.1}s", self.uptime_secs)?;
        writeln!(f, "Signals received:     {}", self.signals_received)?;
        writeln!(f, "Signals unauthorized: {}", self.signals_unauthorized)?;
        writeln!(f, "Signals invalid:      {}", self.signals_invalid)?;
        writeln!(f, "Signals skipped:      {}", self.signals_skipped)?;
        writeln!(f, "Orders placed:        {}", self.orders_placed)?;
        writeln!(f, "Orders failed:        {}", self.orders_failed)?;
        if let Some(secs) = self.secs_since_last_signal {
            writeln!(f, "Since last signal:    {:.1}s", secs)?;
        }
        Ok(())
    }
}

/// Shared handle to metrics.
pub type SharedMetrics = Arc<RelayMetrics>;

pub fn create_metrics() -> SharedMetrics {
    Arc::new(RelayMetrics::new())
}
