//! Environment-driven server configuration.

use common::UpstoxEnvironment;
use relay::RiskLimits;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use thiserror::Error;

/// Default webhook listen address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default directory for cached instrument catalogs.
const DEFAULT_CACHE_DIR: &str = "instrument-cache";

/// Errors loading server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingVar(String),

    /// An environment variable holds a value that does not parse.
    #[error("invalid value for {name}: '{value}'")]
    InvalidVar {
        /// Variable name.
        name: String,
        /// The offending value.
        value: String,
    },
}

/// PostgREST storage coordinates.
#[derive(Clone)]
pub struct StorageSettings {
    /// Base URL of the PostgREST deployment.
    pub url: String,
    /// Service API key, sent as both `apikey` and bearer token.
    pub api_key: String,
}

impl std::fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSettings")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug)]
pub struct RelayConfig {
    webhook_secret: SecretString,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Which broker environment orders go to.
    pub environment: UpstoxEnvironment,
    /// Risk gate limits.
    pub limits: RiskLimits,
    /// Record store coordinates; in-memory storage when absent.
    pub storage: Option<StorageSettings>,
    /// Directory for cached instrument catalogs.
    pub cache_dir: PathBuf,
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file when present. `WEBHOOK_SECRET` is required;
    /// everything else falls back to a default. Recognized variables:
    ///
    /// - `WEBHOOK_SECRET` - shared secret TradingView alerts must carry
    /// - `BIND_ADDR` - listen address (default `0.0.0.0:8080`)
    /// - `UPSTOX_ENVIRONMENT` - `production` or `sandbox`
    /// - `MAX_QUANTITY_PER_TRADE`, `MAX_CAPITAL_PER_TRADE`,
    ///   `MAX_OPEN_POSITIONS` - risk limits
    /// - `STORAGE_URL`, `STORAGE_API_KEY` - PostgREST record store
    /// - `INSTRUMENT_CACHE_DIR` - catalog cache directory
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let webhook_secret = std::env::var("WEBHOOK_SECRET")
            .map_err(|_| ConfigError::MissingVar("WEBHOOK_SECRET".to_string()))?;

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let environment = UpstoxEnvironment::from_env();

        let defaults = RiskLimits::default();
        let limits = RiskLimits::new()
            .with_max_quantity_per_trade(parse_var(
                "MAX_QUANTITY_PER_TRADE",
                defaults.max_quantity_per_trade,
            )?)
            .with_max_capital_per_trade(parse_var(
                "MAX_CAPITAL_PER_TRADE",
                defaults.max_capital_per_trade,
            )?)
            .with_max_open_positions(parse_var(
                "MAX_OPEN_POSITIONS",
                defaults.max_open_positions,
            )?);

        let storage = match std::env::var("STORAGE_URL") {
            Ok(url) => {
                let api_key = std::env::var("STORAGE_API_KEY")
                    .map_err(|_| ConfigError::MissingVar("STORAGE_API_KEY".to_string()))?;
                Some(StorageSettings { url, api_key })
            }
            Err(_) => None,
        };

        let cache_dir = std::env::var("INSTRUMENT_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR));

        Ok(Self {
            webhook_secret: SecretString::from(webhook_secret),
            bind_addr,
            environment,
            limits,
            storage,
            cache_dir,
        })
    }

    /// Build a config from explicit values, defaults elsewhere.
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: SecretString::from(webhook_secret.into()),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            environment: UpstoxEnvironment::default(),
            limits: RiskLimits::default(),
            storage: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }

    pub fn with_limits(mut self, limits: RiskLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Whether a webhook token matches the configured secret.
    pub fn webhook_secret_matches(&self, token: &str) -> bool {
        self.webhook_secret.expose_secret() == token
    }
}

/// Parse an optional environment variable, defaulting when unset.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
            name: name.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_var_default_when_unset() {
        let value: u32 = parse_var("RELAY_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_reads_value() {
        std::env::set_var("RELAY_TEST_QUANTITY_VAR", " 250 ");
        let value: u32 = parse_var("RELAY_TEST_QUANTITY_VAR", 42).unwrap();
        std::env::remove_var("RELAY_TEST_QUANTITY_VAR");

        assert_eq!(value, 250);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        std::env::set_var("RELAY_TEST_BAD_VAR", "not-a-number");
        let result: Result<u32, _> = parse_var("RELAY_TEST_BAD_VAR", 42);
        std::env::remove_var("RELAY_TEST_BAD_VAR");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar { name, value })
                if name == "RELAY_TEST_BAD_VAR" && value == "not-a-number"
        ));
    }

    #[test]
    fn test_webhook_secret_matches() {
        let config = RelayConfig::new("hunter2");
        assert!(config.webhook_secret_matches("hunter2"));
        assert!(!config.webhook_secret_matches("hunter3"));
        assert!(!config.webhook_secret_matches(""));
    }

    #[test]
    fn test_with_limits() {
        let limits = RiskLimits::new().with_max_capital_per_trade(dec!(5000));
        let config = RelayConfig::new("secret").with_limits(limits);
        assert_eq!(config.limits.max_capital_per_trade, dec!(5000));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = RelayConfig::new("very-secret-token");
        config.storage = Some(StorageSettings {
            url: "https://db.example.com".to_string(),
            api_key: "service-role-key".to_string(),
        });

        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("very-secret-token"));
        assert!(!debug_str.contains("service-role-key"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
