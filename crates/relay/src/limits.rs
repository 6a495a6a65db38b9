//! Risk gate configuration.
//!
//! Caps on what a single webhook signal may do to the account.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Limits enforced by the risk gate.
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Maximum quantity for a single order.
    pub max_quantity_per_trade: u32,

    /// Maximum notional value for a single order.
    pub max_capital_per_trade: Decimal,

    /// Maximum number of open positions across all symbols.
    pub max_open_positions: usize,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_quantity_per_trade: 100,
            max_capital_per_trade: dec!(100000), // 1 lakh INR
            max_open_positions: 5,
        }
    }
}

impl RiskLimits {
    /// Create limits with all default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the per-trade quantity cap.
    pub fn with_max_quantity_per_trade(mut self, limit: u32) -> Self {
        self.max_quantity_per_trade = limit;
        self
    }

    /// Builder method to set the per-trade capital cap.
    pub fn with_max_capital_per_trade(mut self, limit: Decimal) -> Self {
        self.max_capital_per_trade = limit;
        self
    }

    /// Builder method to set the open-position cap.
    pub fn with_max_open_positions(mut self, limit: usize) -> Self {
        self.max_open_positions = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = RiskLimits::default();

        assert_eq!(limits.max_quantity_per_trade, 100);
        assert_eq!(limits.max_capital_per_trade, dec!(100000));
        assert_eq!(limits.max_open_positions, 5);
    }

    #[test]
    fn test_builder_methods() {
        let limits = RiskLimits::new()
            .with_max_quantity_per_trade(10)
            .with_max_capital_per_trade(dec!(25000))
            .with_max_open_positions(2);

        assert_eq!(limits.max_quantity_per_trade, 10);
        assert_eq!(limits.max_capital_per_trade, dec!(25000));
        assert_eq!(limits.max_open_positions, 2);
    }
}
