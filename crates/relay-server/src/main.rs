//! Signal relay entry point.
//!
//! Wires the broker client, instrument directory, record store and
//! pipeline together, restores any persisted broker token, spawns the
//! maintenance loops and serves the HTTP surface until Ctrl+C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use auth::OAuthCredentials;
use instruments::InstrumentDirectory;
use relay::{RiskGate, SharedBroker, SignalPipeline, SignalTracker, TokenManager};
use storage::{HttpRecordStore, MemoryRecordStore, SharedRecordStore};
use upstox_rest::UpstoxRestClient;

use relay_server::jobs::spawn_jobs;
use relay_server::{build_router, create_metrics, AppState, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_logging();

    let config = Arc::new(RelayConfig::from_env()?);
    info!(
        environment = %config.environment,
        bind_addr = %config.bind_addr,
        "Starting signal relay"
    );

    let credentials = OAuthCredentials::from_env()?;
    let broker: SharedBroker = Arc::new(UpstoxRestClient::with_environment(
        credentials,
        config.environment,
    )?);

    let store: SharedRecordStore = match &config.storage {
        Some(settings) => {
            info!(url = %settings.url, "Using HTTP record store");
            Arc::new(HttpRecordStore::new(&settings.url, settings.api_key.clone())?)
        }
        None => {
            warn!("STORAGE_URL not set; tokens and order logs will not survive a restart");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let directory = Arc::new(InstrumentDirectory::new(
        config.environment.assets_base_url(),
        config.cache_dir.clone(),
    )?);

    let report = directory.sync().await;
    if report.any_loaded() {
        info!(
            instruments = report.total_instruments,
            fetched = report.fetched.len(),
            cached = report.cached.len(),
            "Instrument directory ready"
        );
    } else {
        warn!("Instrument directory is empty; lookups will fail until the next resync");
    }

    let tokens = Arc::new(TokenManager::new(broker.clone(), store.clone()));
    if tokens.load_from_store().await {
        info!("Broker token pair restored from store");
    }

    let metrics = create_metrics();
    let pipeline = Arc::new(SignalPipeline::new(
        broker.clone(),
        directory.clone(),
        tokens.clone(),
        store.clone(),
        RiskGate::new(config.limits.clone()),
    ));

    let state = AppState {
        config: config.clone(),
        broker,
        directory,
        store,
        tokens,
        tracker: Arc::new(SignalTracker::new()),
        pipeline,
        metrics: metrics.clone(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, initiating shutdown");
            let _ = ctrl_c_tx.send(true);
        }
    });

    spawn_jobs(state.clone(), shutdown_rx.clone());

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Webhook server listening");

    let mut serve_shutdown_rx = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown_rx.changed().await;
        })
        .await?;

    println!("\n{}", metrics.snapshot());
    info!("Shutdown complete");

    Ok(())
}
