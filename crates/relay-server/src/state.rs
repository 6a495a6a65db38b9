//! State shared by every request handler.

use std::sync::Arc;

use instruments::SharedInstrumentDirectory;
use relay::{SharedBroker, SignalPipeline, SignalTracker, TokenManager};
use storage::SharedRecordStore;

use crate::config::RelayConfig;
use crate::metrics::SharedMetrics;

/// Handles the router clones into each handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub broker: SharedBroker,
    pub directory: SharedInstrumentDirectory,
    pub store: SharedRecordStore,
    pub tokens: Arc<TokenManager>,
    pub tracker: Arc<SignalTracker>,
    pub pipeline: Arc<SignalPipeline>,
    pub metrics: SharedMetrics,
}
