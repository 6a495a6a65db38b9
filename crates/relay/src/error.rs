//! Relay error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons why the risk gate refused a signal.
///
/// Rejections are expected outcomes, not faults: the pipeline records
/// them as skipped signals and the webhook still acknowledges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateRejection {
    /// Same symbol and action accepted within the dedup window.
    #[error("duplicate signal")]
    DuplicateSignal,

    /// A long position for the symbol is already open.
    #[error("existing long position for {symbol}")]
    LongPositionExists {
        /// Plain trading symbol.
        symbol: String,
    },

    /// A short position for the symbol is already open.
    #[error("existing short position for {symbol}")]
    ShortPositionExists {
        /// Plain trading symbol.
        symbol: String,
    },

    /// Opening a new symbol would exceed the open-position cap.
    #[error("open position limit reached ({count}/{limit})")]
    PositionLimitReached {
        /// Positions currently open.
        count: usize,
        /// Maximum allowed open positions.
        limit: usize,
    },

    /// Order quantity exceeds the per-trade cap.
    #[error("quantity {quantity} exceeds per-trade limit {limit}")]
    QuantityAboveLimit {
        /// Requested quantity.
        quantity: u32,
        /// Maximum allowed quantity.
        limit: u32,
    },

    /// Order value exceeds the per-trade capital cap.
    #[error("order value {required} exceeds capital limit {limit}")]
    CapitalAboveLimit {
        /// Order notional value.
        required: Decimal,
        /// Maximum allowed capital per trade.
        limit: Decimal,
    },

    /// Available margin does not cover the order value.
    #[error("insufficient margin: required {required}, available {available}")]
    InsufficientMargin {
        /// Order notional value.
        required: Decimal,
        /// Margin available in the account.
        available: Decimal,
    },
}
