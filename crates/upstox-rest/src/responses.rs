//! Upstox API response types.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Response from POST /login/authorization/token.
///
/// Returned for both the authorization-code and refresh grants.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Absent for app types without the refresh-token entitlement.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response from GET /user/funds-and-margin.
#[derive(Debug, Clone, Deserialize)]
pub struct FundsAndMarginResponse {
    pub status: String,
    pub data: FundsData,
}

/// Per-segment fund figures.
#[derive(Debug, Clone, Deserialize)]
pub struct FundsData {
    pub equity: SegmentFunds,
    #[serde(default)]
    pub commodity: Option<SegmentFunds>,
}

/// Margin figures for one segment.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentFunds {
    pub available_margin: Decimal,
    #[serde(default)]
    pub used_margin: Option<Decimal>,
}

/// Response from GET /portfolio/short-term-positions.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionsResponse {
    pub status: String,
    pub data: Vec<BrokerPosition>,
}

/// One net position as reported by the broker.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerPosition {
    /// Plain trading symbol without exchange prefix (e.g., "SBIN").
    #[serde(alias = "tradingsymbol")]
    pub trading_symbol: String,
    pub exchange: String,
    /// Signed net quantity: positive long, negative short, zero flat.
    pub quantity: i64,
    pub instrument_token: String,
}

impl BrokerPosition {
    /// Position has non-zero net quantity.
    pub fn is_open(&self) -> bool {
        self.quantity != 0
    }

    pub fn is_long(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0
    }
}

/// Response from POST /order/place.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderResponse {
    pub status: String,
    pub data: PlaceOrderData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderData {
    pub order_id: String,
}
