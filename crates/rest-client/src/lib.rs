//! Generic REST client infrastructure.
//!
//! This crate provides a thin wrapper around `reqwest` with:
//!
//! - Consistent error handling via `RestError`
//! - JSON and form-urlencoded request bodies
//! - JSON response deserialization, plus raw-bytes fetches
//! - Header injection for authentication
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_client::RestClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct FundsResponse {
//!     status: String,
//! }
//!
//! let client = RestClient::with_default_timeout("https://api.upstox.com/v2")?;
//! let headers = [("Authorization", "Bearer ...")];
//! let funds: FundsResponse = client
//!     .get("/user/funds-and-margin", Some("segment=SEC"), Some(&headers))
//!     .await?;
//! ```

mod client;
mod error;

pub use client::RestClient;
pub use error::RestError;
