//! Shared fixtures for the server integration tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use instruments::InstrumentDirectory;
use relay::{BrokerApi, RiskGate, SignalPipeline, SignalTracker, TokenManager};
use relay_server::{build_router, create_metrics, AppState, RelayConfig};
use storage::{MemoryRecordStore, SharedRecordStore};
use upstox_rest::{BrokerPosition, MarketOrderParams, TokenResponse, UpstoxRestError};

pub const TEST_SECRET: &str = "test-webhook-secret";

/// Broker double returning scripted responses and counting calls.
pub struct MockBroker {
    pub positions: Vec<BrokerPosition>,
    pub order_id: String,
    pub fail_order: bool,
    pub margin_calls: AtomicUsize,
    pub position_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    pub exchange_calls: AtomicUsize,
    pub placed: Mutex<Vec<MarketOrderParams>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            order_id: "240825010331445".to_string(),
            fail_order: false,
            margin_calls: AtomicUsize::new(0),
            position_calls: AtomicUsize::new(0),
            order_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
            placed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_positions(mut self, positions: Vec<BrokerPosition>) -> Self {
        self.positions = positions;
        self
    }

    pub fn failing_order(mut self) -> Self {
        self.fail_order = true;
        self
    }

    pub fn order_count(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub fn position_count(&self) -> usize {
        self.position_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerApi for MockBroker {
    fn authorize_url(&self) -> Result<String, UpstoxRestError> {
        Ok("https://broker.example.com/login/authorization/dialog?client_id=mock".to_string())
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenResponse, UpstoxRestError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TokenResponse {
            access_token: "exchanged-access".to_string(),
            refresh_token: Some("exchanged-refresh".to_string()),
        })
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenResponse, UpstoxRestError> {
        Ok(TokenResponse {
            access_token: "refreshed-access".to_string(),
            refresh_token: Some("refreshed-refresh".to_string()),
        })
    }

    async fn available_margin(&self, _access_token: &str) -> Result<Decimal, UpstoxRestError> {
        self.margin_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Decimal::from(1_000_000))
    }

    async fn positions(
        &self,
        _access_token: &str,
    ) -> Result<Vec<BrokerPosition>, UpstoxRestError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.positions.clone())
    }

    async fn place_market_order(
        &self,
        _access_token: &str,
        params: &MarketOrderParams,
    ) -> Result<String, UpstoxRestError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_order {
            return Err(UpstoxRestError::ApiError {
                code: "UDAPI1000".to_string(),
                message: "insufficient funds at the broker".to_string(),
            });
        }

        self.placed.lock().push(params.clone());
        Ok(self.order_id.clone())
    }
}

/// Net position as the broker would report it.
pub fn position(symbol: &str, quantity: i64) -> BrokerPosition {
    BrokerPosition {
        trading_symbol: symbol.to_string(),
        exchange: "NSE".to_string(),
        quantity,
        instrument_token: format!("NSE_EQ|{}", symbol),
    }
}

fn write_catalog(dir: &Path, symbols: &[&str]) {
    let entries: Vec<serde_json::Value> = symbols
        .iter()
        .map(|s| {
            serde_json::json!({
                "instrument_key": format!("NSE_EQ|{}", s),
                "trading_symbol": s,
                "exchange": "NSE",
                "instrument_type": "EQ",
                "name": format!("{} LTD", s),
            })
        })
        .collect();

    std::fs::write(dir.join("NSE.json"), serde_json::to_vec(&entries).unwrap()).unwrap();
}

/// A fully wired test application over a scripted broker.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryRecordStore>,
    pub broker: Arc<MockBroker>,
}

/// App with a broker token already adopted and SBIN resolvable.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_broker(MockBroker::new()).await
}

pub async fn create_test_app_with_broker(broker: MockBroker) -> TestApp {
    let broker = Arc::new(broker);
    let store = Arc::new(MemoryRecordStore::new());
    let shared_store: SharedRecordStore = store.clone();

    let temp = tempfile::tempdir().unwrap();
    write_catalog(temp.path(), &["SBIN", "RELIANCE", "TATAMOTORS"]);

    // Port 1 refuses connections, so sync falls back to the cache
    let directory = Arc::new(
        InstrumentDirectory::with_segments("http://127.0.0.1:1", temp.path(), &["NSE"]).unwrap(),
    );
    directory.sync().await;

    let tokens = Arc::new(TokenManager::new(broker.clone(), shared_store.clone()));
    tokens
        .adopt("test-access".into(), "test-refresh".into())
        .await;

    let config = Arc::new(RelayConfig::new(TEST_SECRET));
    let pipeline = Arc::new(SignalPipeline::new(
        broker.clone(),
        directory.clone(),
        tokens.clone(),
        shared_store.clone(),
        RiskGate::new(config.limits.clone()),
    ));

    let state = AppState {
        config,
        broker: broker.clone(),
        directory,
        store: shared_store,
        tokens,
        tracker: Arc::new(SignalTracker::new()),
        pipeline,
        metrics: create_metrics(),
    };

    TestApp {
        router: build_router(state),
        store,
        broker,
    }
}

/// Build a JSON POST request.
pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll until a spawned pipeline task has settled.
pub async fn wait_until(description: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {}", description);
}
