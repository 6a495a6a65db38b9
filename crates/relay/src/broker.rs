//! Brokerage access behind a trait.
//!
//! The pipeline, token manager and HTTP handlers talk to the brokerage
//! through [`BrokerApi`] so tests can substitute a scripted broker. The
//! production implementation delegates to [`UpstoxRestClient`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use upstox_rest::{
    BrokerPosition, MarketOrderParams, TokenResponse, UpstoxRestClient, UpstoxRestError,
};

/// Brokerage operations the relay depends on.
#[async_trait]
pub trait BrokerApi: Send + Sync {
    /// Authorization dialog URL for the OAuth login redirect.
    fn authorize_url(&self) -> Result<String, UpstoxRestError>;

    /// Exchange an authorization code for a token pair.
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, UpstoxRestError>;

    /// Rotate a token pair using the refresh grant.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, UpstoxRestError>;

    /// Margin available for equity trades.
    async fn available_margin(&self, access_token: &str) -> Result<Decimal, UpstoxRestError>;

    /// Current net positions.
    async fn positions(&self, access_token: &str)
        -> Result<Vec<BrokerPosition>, UpstoxRestError>;

    /// Place a market order, returning the broker-assigned order id.
    async fn place_market_order(
        &self,
        access_token: &str,
        params: &MarketOrderParams,
    ) -> Result<String, UpstoxRestError>;
}

#[async_trait]
impl BrokerApi for UpstoxRestClient {
    fn authorize_url(&self) -> Result<String, UpstoxRestError> {
        UpstoxRestClient::authorize_url(self)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, UpstoxRestError> {
        UpstoxRestClient::exchange_code(self, code).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, UpstoxRestError> {
        UpstoxRestClient::refresh_token(self, refresh_token).await
    }

    async fn available_margin(&self, access_token: &str) -> Result<Decimal, UpstoxRestError> {
        let funds = self.funds_and_margin(access_token).await?;
        Ok(funds.equity.available_margin)
    }

    async fn positions(
        &self,
        access_token: &str,
    ) -> Result<Vec<BrokerPosition>, UpstoxRestError> {
        self.short_term_positions(access_token).await
    }

    async fn place_market_order(
        &self,
        access_token: &str,
        params: &MarketOrderParams,
    ) -> Result<String, UpstoxRestError> {
        UpstoxRestClient::place_market_order(self, access_token, params).await
    }
}

/// Shared handle to a broker implementation.
pub type SharedBroker = Arc<dyn BrokerApi>;
