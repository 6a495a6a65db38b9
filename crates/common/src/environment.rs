//! Upstox environment configuration.
//!
//! Supports production and sandbox environments with appropriate URLs.

use std::fmt;
use std::str::FromStr;

/// Upstox environment (production or sandbox).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpstoxEnvironment {
    /// Production environment (real money).
    #[default]
    Production,
    /// Sandbox environment (simulated trading for testing).
    Sandbox,
}

impl UpstoxEnvironment {
    /// REST API base URL, including the API version prefix.
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            Self::Production => "https://api.upstox.com/v2",
            Self::Sandbox => "https://api-sandbox.upstox.com/v2",
        }
    }

    /// Base URL for the published instrument catalogs.
    ///
    /// The catalogs are static assets; Upstox serves them from the same
    /// host regardless of environment.
    pub fn assets_base_url(&self) -> &'static str {
        "https://assets.upstox.com/market-quote/instruments/exchange"
    }

    /// Returns true if this is the production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Returns true if this is the sandbox environment.
    pub fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }

    /// Load environment from `UPSTOX_ENVIRONMENT` env var.
    ///
    /// Returns `Production` if not set or invalid.
    pub fn from_env() -> Self {
        std::env::var("UPSTOX_ENVIRONMENT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for UpstoxEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Sandbox => write!(f, "sandbox"),
        }
    }
}

impl FromStr for UpstoxEnvironment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" | "live" => Ok(Self::Production),
            "sandbox" | "test" | "uat" => Ok(Self::Sandbox),
            _ => Err(ParseEnvironmentError(s.to_string())),
        }
    }
}

/// Error parsing environment string.
#[derive(Debug, Clone)]
pub struct ParseEnvironmentError(String);

impl fmt::Display for ParseEnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid environment '{}', expected 'production' or 'sandbox'",
            self.0
        )
    }
}

impl std::error::Error for ParseEnvironmentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_urls() {
        let env = UpstoxEnvironment::Production;
        assert_eq!(env.rest_base_url(), "https://api.upstox.com/v2");
        assert_eq!(
            env.assets_base_url(),
            "https://assets.upstox.com/market-quote/instruments/exchange"
        );
        assert!(env.is_production());
        assert!(!env.is_sandbox());
    }

    #[test]
    fn test_sandbox_urls() {
        let env = UpstoxEnvironment::Sandbox;
        assert_eq!(env.rest_base_url(), "https://api-sandbox.upstox.com/v2");
        assert!(!env.is_production());
        assert!(env.is_sandbox());
    }

    #[test]
    fn test_parse_production() {
        assert_eq!(
            "production".parse::<UpstoxEnvironment>().unwrap(),
            UpstoxEnvironment::Production
        );
        assert_eq!(
            "prod".parse::<UpstoxEnvironment>().unwrap(),
            UpstoxEnvironment::Production
        );
        assert_eq!(
            "LIVE".parse::<UpstoxEnvironment>().unwrap(),
            UpstoxEnvironment::Production
        );
    }

    #[test]
    fn test_parse_sandbox() {
        assert_eq!(
            "sandbox".parse::<UpstoxEnvironment>().unwrap(),
            UpstoxEnvironment::Sandbox
        );
        assert_eq!(
            "test".parse::<UpstoxEnvironment>().unwrap(),
            UpstoxEnvironment::Sandbox
        );
        assert_eq!(
            "UAT".parse::<UpstoxEnvironment>().unwrap(),
            UpstoxEnvironment::Sandbox
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!("invalid".parse::<UpstoxEnvironment>().is_err());
    }

    #[test]
    fn test_default() {
        assert_eq!(
            UpstoxEnvironment::default(),
            UpstoxEnvironment::Production
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(UpstoxEnvironment::Production.to_string(), "production");
        assert_eq!(UpstoxEnvironment::Sandbox.to_string(), "sandbox");
    }
}
