//! Secure OAuth application credential management.
//!
//! Uses the `secrecy` crate to prevent accidental logging of the client
//! secret and ensures memory is zeroed on drop.

use crate::error::AuthError;
use secrecy::{ExposeSecret, SecretString};

/// OAuth application credentials for the brokerage API.
///
/// The client secret is wrapped in `SecretString` which:
/// - Prevents accidental Debug/Display printing
/// - Zeros memory on drop via zeroize
#[derive(Clone)]
pub struct OAuthCredentials {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
}

impl OAuthCredentials {
    /// Load credentials from environment variables.
    ///
    /// Looks for:
    /// - `UPSTOX_CLIENT_ID` - The OAuth client id (public)
    /// - `UPSTOX_CLIENT_SECRET` - The OAuth client secret (private)
    /// - `UPSTOX_REDIRECT_URI` - Redirect URI registered with the broker
    ///
    /// # Errors
    /// Returns `AuthError::MissingEnvVar` if any variable is not set.
    pub fn from_env() -> Result<Self, AuthError> {
        // Load .env file if present (ignores errors if file doesn't exist)
        dotenvy::dotenv().ok();

        let client_id = std::env::var("UPSTOX_CLIENT_ID")
            .map_err(|_| AuthError::MissingEnvVar("UPSTOX_CLIENT_ID".into()))?;

        let client_secret = std::env::var("UPSTOX_CLIENT_SECRET")
            .map_err(|_| AuthError::MissingEnvVar("UPSTOX_CLIENT_SECRET".into()))?;

        let redirect_uri = std::env::var("UPSTOX_REDIRECT_URI")
            .map_err(|_| AuthError::MissingEnvVar("UPSTOX_REDIRECT_URI".into()))?;

        Ok(Self::new(client_id, client_secret, redirect_uri))
    }

    /// Create credentials from explicit values.
    ///
    /// Useful for testing or when credentials come from other sources.
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret: SecretString::from(client_secret),
            redirect_uri,
        }
    }

    /// Get the OAuth client id (public, safe to log).
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Get the registered redirect URI.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Expose the client secret for token endpoint requests.
    ///
    /// **WARNING**: Only use this when building token exchange requests.
    /// Never log or display the return value.
    pub fn expose_client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = OAuthCredentials::new(
            "my_client_id".into(),
            "my_secret".into(),
            "https://example.com/auth/callback".into(),
        );
        assert_eq!(creds.client_id(), "my_client_id");
        assert_eq!(creds.expose_client_secret(), "my_secret");
        assert_eq!(creds.redirect_uri(), "https://example.com/auth/callback");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = OAuthCredentials::new(
            "my_client_id".into(),
            "super_secret_key".into(),
            "https://example.com/auth/callback".into(),
        );
        let debug_str = format!("{:?}", creds);

        assert!(debug_str.contains("my_client_id"));
        assert!(!debug_str.contains("super_secret_key"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
