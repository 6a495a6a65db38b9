//! Access/refresh token pair with locally tracked expiry.
//!
//! The broker invalidates access tokens daily but does not report an
//! expiry timestamp, so expiry is approximated from the acquisition time.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Assumed lifetime of an access token, in hours.
///
/// Upstox access tokens die at the daily 3:30 AM IST cutoff; 23 hours
/// from acquisition is a safe local approximation.
pub const TOKEN_VALIDITY_HOURS: i64 = 23;

/// Margin before expiry at which a pair is treated as stale, in seconds.
pub const STALENESS_MARGIN_SECS: i64 = 60;

/// An access/refresh token pair issued by the OAuth token endpoint.
#[derive(Clone)]
pub struct TokenPair {
    access_token: SecretString,
    refresh_token: SecretString,
    expires_at: DateTime<Utc>,
}

impl TokenPair {
    /// Create a pair acquired at the given instant.
    ///
    /// Expiry is set `TOKEN_VALIDITY_HOURS` after `acquired_at`.
    pub fn new(access_token: String, refresh_token: String, acquired_at: DateTime<Utc>) -> Self {
        Self::with_expiry(
            access_token,
            refresh_token,
            acquired_at + Duration::hours(TOKEN_VALIDITY_HOURS),
        )
    }

    /// Create a pair with an explicit expiry instant.
    pub fn with_expiry(
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: SecretString::from(access_token),
            refresh_token: SecretString::from(refresh_token),
            expires_at,
        }
    }

    /// Expose the access token for Authorization headers.
    ///
    /// **WARNING**: Never log or display the return value.
    pub fn expose_access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Expose the refresh token for refresh grants.
    pub fn expose_refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    /// When this pair expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the pair is within `STALENESS_MARGIN_SECS` of expiry,
    /// or already past it.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - Duration::seconds(STALENESS_MARGIN_SECS)
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
