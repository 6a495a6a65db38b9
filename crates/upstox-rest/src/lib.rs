//! Upstox REST API client.
//!
//! Wraps the broker's v2 HTTP API:
//!
//! - OAuth authorization-code exchange and refresh grants
//! - Funds and margin lookup (equity segment)
//! - Net position listing
//! - Market order placement
//!
//! Authenticated calls take the access token explicitly; token lifecycle
//! is owned by the caller. Error bodies in the Upstox envelope are parsed
//! into `UpstoxRestError` so callers can react to specific codes.

mod client;
mod error;
mod responses;

pub use client::{MarketOrderParams, UpstoxRestClient};
pub use error::UpstoxRestError;
pub use responses::{
    BrokerPosition, FundsAndMarginResponse, FundsData, PlaceOrderData, PlaceOrderResponse,
    PositionsResponse, SegmentFunds, TokenResponse,
};
