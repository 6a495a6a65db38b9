//! Upstox REST API client.

use crate::error::UpstoxRestError;
use crate::responses::{
    BrokerPosition, FundsAndMarginResponse, FundsData, PlaceOrderResponse, PositionsResponse,
    TokenResponse,
};
use auth::OAuthCredentials;
use common::UpstoxEnvironment;
use model::TradeAction;
use rest_client::RestClient;
use serde::Serialize;
use std::time::Duration;

/// Request timeout for Upstox API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Segment identifier for equity funds.
const EQUITY_SEGMENT: &str = "SEC";

/// Parameters for a market order.
#[derive(Debug, Clone)]
pub struct MarketOrderParams {
    /// Broker instrument key (e.g., "NSE_EQ|INE062A01020").
    pub instrument_token: String,
    pub quantity: u32,
    pub transaction_type: TradeAction,
    /// Client-side tag for correlating orders in the broker's reports.
    pub tag: String,
}

/// Wire format for POST /order/place.
#[derive(Debug, Serialize)]
struct PlaceOrderRequest<'a> {
    quantity: u32,
    product: &'a str,
    validity: &'a str,
    price: u32,
    tag: &'a str,
    instrument_token: &'a str,
    order_type: &'a str,
    transaction_type: &'a str,
    disclosed_quantity: u32,
    trigger_price: u32,
    is_amo: bool,
}

/// Upstox REST API client with OAuth support.
///
/// Token lifecycle is owned by the caller; every authenticated call takes
/// the access token explicitly.
pub struct UpstoxRestClient {
    client: RestClient,
    credentials: OAuthCredentials,
    environment: UpstoxEnvironment,
}

impl UpstoxRestClient {
    /// Create a new Upstox REST client for production.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(credentials: OAuthCredentials) -> Result<Self, UpstoxRestError> {
        Self::with_environment(credentials, UpstoxEnvironment::Production)
    }

    /// Create a new Upstox REST client for a specific environment.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_environment(
        credentials: OAuthCredentials,
        environment: UpstoxEnvironment,
    ) -> Result<Self, UpstoxRestError> {
        let client = RestClient::new(environment.rest_base_url(), REQUEST_TIMEOUT)?;

        Ok(Self {
            client,
            credentials,
            environment,
        })
    }

    /// Get the environment this client is connected to.
    pub fn environment(&self) -> UpstoxEnvironment {
        self.environment
    }

    // ========================================================================
    // OAuth
    // ========================================================================

    /// Build the authorization dialog URL the operator must visit.
    ///
    /// GET /login/authorization/dialog
    pub fn authorize_url(&self) -> Result<String, UpstoxRestError> {
        let base = format!(
            "{}/login/authorization/dialog",
            self.environment.rest_base_url()
        );

        let url = reqwest::Url::parse_with_params(
            &base,
            &[
                ("response_type", "code"),
                ("client_id", self.credentials.client_id()),
                ("redirect_uri", self.credentials.redirect_uri()),
            ],
        )
        .map_err(|e| UpstoxRestError::Parse(e.to_string()))?;

        Ok(url.to_string())
    }

    /// Exchange an authorization code for a token pair.
    ///
    /// POST /login/authorization/token (grant_type=authorization_code)
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, UpstoxRestError> {
        let form = [
            ("code", code),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.expose_client_secret()),
            ("redirect_uri", self.credentials.redirect_uri()),
            ("grant_type", "authorization_code"),
        ];

        tracing::info!(
            client_id = %self.credentials.client_id(),
            "Exchanging authorization code"
        );

        let response: TokenResponse = self
            .client
            .post_form("/login/authorization/token", &form, None)
            .await
            .map_err(UpstoxRestError::from_rest)?;

        tracing::info!("Authorization code exchanged");

        Ok(response)
    }

    /// Rotate a token pair using the refresh grant.
    ///
    /// POST /login/authorization/token (grant_type=refresh_token)
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, UpstoxRestError> {
        let form = [
            ("refresh_token", refresh_token),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.expose_client_secret()),
            ("grant_type", "refresh_token"),
        ];

        tracing::info!(
            client_id = %self.credentials.client_id(),
            "Refreshing access token"
        );

        let response: TokenResponse = self
            .client
            .post_form("/login/authorization/token", &form, None)
            .await
            .map_err(UpstoxRestError::from_rest)?;

        tracing::info!("Access token refreshed");

        Ok(response)
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Fetch funds and margin for the equity segment.
    ///
    /// GET /user/funds-and-margin
    pub async fn funds_and_margin(&self, access_token: &str) -> Result<FundsData, UpstoxRestError> {
        let auth = format!("Bearer {}", access_token);
        let headers = [
            ("Authorization", auth.as_str()),
            ("Accept", "application/json"),
        ];
        let query = format!("segment={}", EQUITY_SEGMENT);

        let response: FundsAndMarginResponse = self
            .client
            .get("/user/funds-and-margin", Some(&query), Some(&headers))
            .await
            .map_err(UpstoxRestError::from_rest)?;

        tracing::debug!(
            available_margin = %response.data.equity.available_margin,
            "Funds and margin received"
        );

        Ok(response.data)
    }

    /// Fetch current net positions.
    ///
    /// GET /portfolio/short-term-positions
    pub async fn short_term_positions(
        &self,
        access_token: &str,
    ) -> Result<Vec<BrokerPosition>, UpstoxRestError> {
        let auth = format!("Bearer {}", access_token);
        let headers = [
            ("Authorization", auth.as_str()),
            ("Accept", "application/json"),
        ];

        let response: PositionsResponse = self
            .client
            .get("/portfolio/short-term-positions", None, Some(&headers))
            .await
            .map_err(UpstoxRestError::from_rest)?;

        tracing::debug!(positions = response.data.len(), "Positions received");

        Ok(response.data)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Place a market order (delivery product, day validity).
    ///
    /// POST /order/place
    ///
    /// Returns the broker-assigned order id.
    pub async fn place_market_order(
        &self,
        access_token: &str,
        params: &MarketOrderParams,
    ) -> Result<String, UpstoxRestError> {
        let body = PlaceOrderRequest {
            quantity: params.quantity,
            product: "D",
            validity: "DAY",
            price: 0,
            tag: &params.tag,
            instrument_token: &params.instrument_token,
            order_type: "MARKET",
            transaction_type: params.transaction_type.as_str(),
            disclosed_quantity: 0,
            trigger_price: 0,
            is_amo: false,
        };

        let auth = format!("Bearer {}", access_token);
        let headers = [
            ("Authorization", auth.as_str()),
            ("Accept", "application/json"),
        ];

        tracing::info!(
            instrument_token = %params.instrument_token,
            transaction_type = %params.transaction_type,
            quantity = params.quantity,
            tag = %params.tag,
            "Placing market order"
        );

        let response: PlaceOrderResponse = self
            .client
            .post_json("/order/place", &body, Some(&headers))
            .await
            .map_err(UpstoxRestError::from_rest)?;

        tracing::info!(order_id = %response.data.order_id, "Order placed");

        Ok(response.data.order_id)
    }
}

impl std::fmt::Debug for UpstoxRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstoxRestClient")
            .field("environment", &self.environment)
            .field("base_url", &self.environment.rest_base_url())
            .field("client_id", &self.credentials.client_id())
            .finish()
    }
}
