use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    /// Parse a TradingView action string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated alert from TradingView, ready for the execution pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    /// Symbol as sent by the alert, possibly exchange-qualified ("NSE:SBIN").
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u32,
    /// Alert price, when the alert template includes one.
    pub price: Option<Decimal>,
}

impl TradingSignal {
    /// Notional value of the order, when the alert carried a price.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.map(|p| p * Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Skipped,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of processing one signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalOutcome {
    pub status: OutcomeStatus,
    pub reason: String,
    pub order_id: Option<String>,
}

impl SignalOutcome {
    pub fn success(order_id: String) -> Self {
        Self {
            status: OutcomeStatus::Success,
            reason: "order placed".to_string(),
            order_id: Some(order_id),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Skipped,
            reason: reason.into(),
            order_id: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            reason: reason.into(),
            order_id: None,
        }
    }
}

/// Audit record persisted for every terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLogEntry {
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u32,
    pub price: Option<Decimal>,
    pub status: OutcomeStatus,
    pub reason: String,
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderLogEntry {
    pub fn from_outcome(
        signal: &TradingSignal,
        outcome: &SignalOutcome,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: signal.symbol.clone(),
            action: signal.action,
            quantity: signal.quantity,
            price: signal.price,
            status: outcome.status,
            reason: outcome.reason.clone(),
            order_id: outcome.order_id.clone(),
            created_at,
        }
    }
}
