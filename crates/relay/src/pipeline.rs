//! Signal execution pipeline.
//!
//! Turns an accepted webhook signal into at most one market order:
//! token check, instrument lookup, position fetch, risk gate, margin
//! check, placement. Every terminal outcome is written to the order
//! log; callers only ever see a [`SignalOutcome`].

use chrono::Utc;
use instruments::{strip_exchange_prefix, SharedInstrumentDirectory};
use model::{OrderLogEntry, OutcomeStatus, SignalOutcome, TradingSignal};
use std::sync::Arc;
use storage::SharedRecordStore;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use upstox_rest::MarketOrderParams;
use uuid::Uuid;

use crate::broker::SharedBroker;
use crate::gate::RiskGate;
use crate::tokens::TokenManager;

/// Executes signals one at a time against the brokerage.
pub struct SignalPipeline {
    broker: SharedBroker,
    directory: SharedInstrumentDirectory,
    tokens: Arc<TokenManager>,
    store: SharedRecordStore,
    gate: RiskGate,
    // One signal in flight at a time, so position checks always see
    // the orders of earlier signals
    exec_lock: Mutex<()>,
}

impl SignalPipeline {
    pub fn new(
        broker: SharedBroker,
        directory: SharedInstrumentDirectory,
        tokens: Arc<TokenManager>,
        store: SharedRecordStore,
        gate: RiskGate,
    ) -> Self {
        Self {
            broker,
            directory,
            tokens,
            store,
            gate,
            exec_lock: Mutex::new(()),
        }
    }

    /// Process one signal end to end and record the outcome.
    pub async fn process(&self, signal: TradingSignal) -> SignalOutcome {
        let _guard = self.exec_lock.lock().await;

        let outcome = self.execute(&signal).await;

        match outcome.status {
            OutcomeStatus::Success => info!(
                symbol = %signal.symbol,
                action = %signal.action,
                quantity = signal.quantity,
                order_id = outcome.order_id.as_deref().unwrap_or("-"),
                "Signal executed"
            ),
            OutcomeStatus::Skipped => info!(
                symbol = %signal.symbol,
                action = %signal.action,
                reason = %outcome.reason,
                "Signal skipped"
            ),
            OutcomeStatus::Failed => warn!(
                symbol = %signal.symbol,
                action = %signal.action,
                reason = %outcome.reason,
                "Signal failed"
            ),
        }

        self.record(&signal, &outcome).await;
        outcome
    }

    async fn execute(&self, signal: &TradingSignal) -> SignalOutcome {
        // Token first; nothing else is possible without one
        if !self.tokens.ensure_valid().await {
            return SignalOutcome::failed("no valid access token");
        }
        let access_token = match self.tokens.access_token() {
            Some(token) => token,
            None => return SignalOutcome::failed("no valid access token"),
        };

        let instrument_token = match self.directory.lookup(&signal.symbol) {
            Some(key) => key,
            None => {
                return SignalOutcome::failed(format!("unknown instrument {}", signal.symbol));
            }
        };
        let trading_symbol = strip_exchange_prefix(&signal.symbol).to_uppercase();

        let positions = match self.broker.positions(&access_token).await {
            Ok(positions) => positions,
            Err(err) => {
                error!(error = %err, "Position fetch failed");
                return SignalOutcome::failed(format!("position fetch failed: {}", err));
            }
        };

        if let Err(rejection) = self.gate.evaluate(signal, &trading_symbol, &positions) {
            return SignalOutcome::skipped(rejection.to_string());
        }

        // Funds lookup only once the size checks have passed
        if signal.price.is_some() {
            let available = match self.broker.available_margin(&access_token).await {
                Ok(margin) => margin,
                Err(err) => {
                    error!(error = %err, "Funds fetch failed");
                    return SignalOutcome::failed(format!("funds fetch failed: {}", err));
                }
            };

            if let Err(rejection) = self.gate.check_margin(signal, available) {
                return SignalOutcome::skipped(rejection.to_string());
            }
        }

        let params = MarketOrderParams {
            instrument_token,
            quantity: signal.quantity,
            transaction_type: signal.action,
            tag: generate_order_tag(),
        };

        match self.broker.place_market_order(&access_token, &params).await {
            Ok(order_id) => SignalOutcome::success(order_id),
            Err(err) => {
                error!(error = %err, "Order placement failed");
                SignalOutcome::failed(format!("order placement failed: {}", err))
            }
        }
    }

    async fn record(&self, signal: &TradingSignal, outcome: &SignalOutcome) {
        let entry = OrderLogEntry::from_outcome(signal, outcome, Utc::now());
        if let Err(err) = self.store.insert_order_log(&entry).await {
            warn!(error = %err, "Failed to persist order log entry");
        }
    }
}

/// Tag attached to orders so broker reports trace back to the relay.
pub fn generate_order_tag() -> String {
    format!("tvr_{}", Uuid::new_v4().as_simple())
}
