//! Core signal relay: duplicate suppression, token lifecycle, risk
//! gate and the execution pipeline.
//!
//! The server crate wires these pieces to the HTTP surface; everything
//! here is transport-agnostic and talks to the brokerage through the
//! [`BrokerApi`] trait.
//!
//! # Processing order
//!
//! ```text
//! webhook -> SignalTracker (dedup) -> SignalPipeline::process
//!            token check -> instrument lookup -> positions
//!            -> RiskGate -> margin check -> market order
//! ```
//!
//! Every terminal outcome, including rejections, lands in the order
//! log through the record store.

mod broker;
mod dedup;
mod error;
mod gate;
mod limits;
mod pipeline;
#[cfg(test)]
mod testkit;
mod tokens;

pub use broker::{BrokerApi, SharedBroker};
pub use dedup::{SignalTracker, DEDUP_WINDOW};
pub use error::GateRejection;
pub use gate::RiskGate;
pub use limits::RiskLimits;
pub use pipeline::{generate_order_tag, SignalPipeline};
pub use tokens::TokenManager;
