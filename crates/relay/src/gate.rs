//! Pre-trade risk gate.
//!
//! Every signal passes the gate before an order goes out. The checks
//! run in a fixed order and the first failure wins. The margin check
//! lives apart from the rest because it needs a funds fetch, and the
//! size checks must pass before that fetch happens.

use model::{TradeAction, TradingSignal};
use rust_decimal::Decimal;
use tracing::debug;
use upstox_rest::BrokerPosition;

use crate::error::GateRejection;
use crate::limits::RiskLimits;

/// Risk gate enforcing the configured limits.
#[derive(Debug, Clone)]
pub struct RiskGate {
    limits: RiskLimits,
}

impl RiskGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Run the position and size checks for a signal.
    ///
    /// Checks in order:
    /// 1. Directional conflict against the symbol's open position
    /// 2. Open-position count, waived when the symbol is already open
    /// 3. Quantity ceiling
    /// 4. Capital ceiling, only when the alert carried a price
    pub fn evaluate(
        &self,
        signal: &TradingSignal,
        trading_symbol: &str,
        positions: &[BrokerPosition],
    ) -> Result<(), GateRejection> {
        // 1. Directional conflict: never stack onto an open position
        //    in the same direction
        let existing = positions
            .iter()
            .find(|p| p.is_open() && p.trading_symbol.eq_ignore_ascii_case(trading_symbol));

        if let Some(position) = existing {
            match signal.action {
                TradeAction::Buy if position.is_long() => {
                    return Err(GateRejection::LongPositionExists {
                        symbol: trading_symbol.to_string(),
                    });
                }
                TradeAction::Sell if position.is_short() => {
                    return Err(GateRejection::ShortPositionExists {
                        symbol: trading_symbol.to_string(),
                    });
                }
                _ => {}
            }
        }

        // 2. Open-position count; signals managing an already-open
        //    symbol are exempt
        let open_count = positions.iter().filter(|p| p.is_open()).count();
        if existing.is_none() && open_count >= self.limits.max_open_positions {
            return Err(GateRejection::PositionLimitReached {
                count: open_count,
                limit: self.limits.max_open_positions,
            });
        }

        // 3. Quantity ceiling
        if signal.quantity > self.limits.max_quantity_per_trade {
            return Err(GateRejection::QuantityAboveLimit {
                quantity: signal.quantity,
                limit: self.limits.max_quantity_per_trade,
            });
        }

        // 4. Capital ceiling
        if let Some(notional) = signal.notional() {
            if notional > self.limits.max_capital_per_trade {
                return Err(GateRejection::CapitalAboveLimit {
                    required: notional,
                    limit: self.limits.max_capital_per_trade,
                });
            }
        }

        debug!(symbol = %signal.symbol, action = %signal.action, "Risk checks passed");
        Ok(())
    }

    /// Check the order value against freshly fetched margin.
    ///
    /// Price-less signals carry no notional and pass trivially.
    pub fn check_margin(
        &self,
        signal: &TradingSignal,
        available: Decimal,
    ) -> Result<(), GateRejection> {
        if let Some(required) = signal.notional() {
            if required > available {
                return Err(GateRejection::InsufficientMargin {
                    required,
                    available,
                });
            }
        }

        Ok(())
    }
}
