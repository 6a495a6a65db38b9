//! Authentication primitives for the brokerage API.
//!
//! This crate provides secure OAuth credential management, access/refresh
//! token pair tracking, and dashboard PIN digests.
//!
//! # Features
//!
//! - **Secure Credentials**: the OAuth client secret and issued tokens are
//!   wrapped in `SecretString` to prevent accidental logging and ensure
//!   memory is zeroed on drop.
//! - **Expiry Tracking**: access tokens are expired locally 23 hours after
//!   acquisition, with a staleness margin that triggers proactive refresh.
//! - **Environment Loading**: credentials can be loaded from environment
//!   variables or a `.env` file.
//!
//! # Example
//!
//! ```rust,ignore
//! use auth::{OAuthCredentials, TokenPair};
//! use chrono::Utc;
//!
//! // Load app credentials from environment
//! let credentials = OAuthCredentials::from_env()?;
//!
//! // Track a freshly issued pair
//! let pair = TokenPair::new(access_token, refresh_token, Utc::now());
//! assert!(!pair.is_stale(Utc::now()));
//! ```

mod credentials;
mod error;
mod pin;
mod token;

pub use credentials::OAuthCredentials;
pub use error::AuthError;
pub use pin::{hash_pin, verify_pin};
pub use token::{TokenPair, STALENESS_MARGIN_SECS, TOKEN_VALIDITY_HOURS};
