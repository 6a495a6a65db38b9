//! HTTP surface of the signal relay.
//!
//! Exposes the TradingView webhook, the broker OAuth login flow, the
//! dashboard API (instrument search, PIN) and a health endpoint, and
//! runs the background maintenance loops. All relay semantics live in
//! the `relay` crate; this crate only wires them to axum.

pub mod config;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::{ConfigError, RelayConfig, StorageSettings};
pub use metrics::{create_metrics, MetricsSnapshot, RelayMetrics, SharedMetrics};
pub use routes::build_router;
pub use state::AppState;
