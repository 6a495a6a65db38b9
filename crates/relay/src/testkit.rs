//! Scripted broker and helpers shared by the relay unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use upstox_rest::{BrokerPosition, MarketOrderParams, TokenResponse, UpstoxRestError};

use crate::broker::BrokerApi;

/// Broker double returning scripted responses and counting calls.
pub struct MockBroker {
    pub margin: Decimal,
    pub positions: Vec<BrokerPosition>,
    pub order_id: String,
    pub fail_order: bool,
    pub fail_refresh: bool,
    pub margin_calls: AtomicUsize,
    pub position_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub placed: Mutex<Vec<MarketOrderParams>>,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            margin: Decimal::from(1_000_000),
            positions: Vec::new(),
            order_id: "240825010331445".to_string(),
            fail_order: false,
            fail_refresh: false,
            margin_calls: AtomicUsize::new(0),
            position_calls: AtomicUsize::new(0),
            order_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            placed: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_margin(mut self, margin: Decimal) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_positions(mut self, positions: Vec<BrokerPosition>) -> Self {
        self.positions = positions;
        self
    }

    pub fn failing_order(mut self) -> Self {
        self.fail_order = true;
        self
    }

    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    fn api_error(message: &str) -> UpstoxRestError {
        UpstoxRestError::ApiError {
            code: "UDAPI1000".to_string(),
            message: message.to_string(),
        }
    }
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerApi for MockBroker {
    fn authorize_url(&self) -> Result<String, UpstoxRestError> {
        Ok("https://broker.example.com/login/authorization/dialog?client_id=mock".to_string())
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenResponse, UpstoxRestError> {
        Ok(TokenResponse {
            access_token: "exchanged-access".to_string(),
            refresh_token: Some("exchanged-refresh".to_string()),
        })
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenResponse, UpstoxRestError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_refresh {
            return Err(UpstoxRestError::InvalidToken(
                "token expired or revoked".to_string(),
            ));
        }

        Ok(TokenResponse {
            access_token: "refreshed-access".to_string(),
            refresh_token: Some("refreshed-refresh".to_string()),
        })
    }

    async fn available_margin(&self, access_token: &str) -> Result<Decimal, UpstoxRestError> {
        self.margin_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().push(access_token.to_string());
        Ok(self.margin)
    }

    async fn positions(
        &self,
        access_token: &str,
    ) -> Result<Vec<BrokerPosition>, UpstoxRestError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().push(access_token.to_string());
        Ok(self.positions.clone())
    }

    async fn place_market_order(
        &self,
        _access_token: &str,
        params: &MarketOrderParams,
    ) -> Result<String, UpstoxRestError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_order {
            return Err(Self::api_error("insufficient funds at the broker"));
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
