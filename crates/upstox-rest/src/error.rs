//! Upstox REST API error types.

use rest_client::RestError;
use thiserror::Error;

/// Errors that can occur when interacting with the Upstox REST API.
#[derive(Debug, Error)]
pub enum UpstoxRestError {
    /// REST client error (network, timeout, etc.).
    #[error("REST client error: {0}")]
    Rest(#[from] RestError),

    /// Upstox API error (returned by the broker).
    #[error("Upstox API error {code}: {message}")]
    ApiError {
        /// Upstox error code (e.g., "UDAPI1021").
        code: String,
        /// Error message.
        message: String,
    },

    /// The access token was rejected by the broker.
    #[error("Access token rejected: {0}")]
    InvalidToken(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl UpstoxRestError {
    /// Parse an Upstox API error response.
    ///
    /// Upstox returns errors in the format:
    /// `{"status": "error", "errors": [{"errorCode": "...", "message": "..."}]}`
    pub fn from_api_response(body: &str) -> Self {
        match Self::try_parse_api_error(body) {
            Some(err) => err,
            None => Self::Parse(format!("Failed to parse error response: {}", body)),
        }
    }

    /// Upgrade a transport-level HTTP error into an API error when the
    /// response body follows the Upstox error envelope.
    pub(crate) fn from_rest(err: RestError) -> Self {
        match err {
            RestError::HttpError { status, message } => {
                match Self::try_parse_api_error(&message) {
                    Some(api_err) => api_err,
                    None => Self::Rest(RestError::HttpError { status, message }),
                }
            }
            other => Self::Rest(other),
        }
    }

    fn try_parse_api_error(body: &str) -> Option<Self> {
        #[derive(serde::Deserialize)]
        struct ApiErrorBody {
            #[serde(default)]
            errors: Vec<ApiErrorItem>,
        }

        #[derive(serde::Deserialize)]
        struct ApiErrorItem {
            #[serde(rename = "errorCode")]
            error_code: String,
            message: String,
        }

        let parsed = serde_json::from_str::<ApiErrorBody>(body).ok()?;
        let first = parsed.errors.into_iter().next()?;
        Some(Self::classify_api_error(first.error_code, first.message))
    }

    /// Classify an Upstox API error code into a more specific error.
    fn classify_api_error(code: String, message: String) -> Self {
        match code.as_str() {
            // Expired, revoked or malformed access token
            "UDAPI100050" => Self::InvalidToken(message),
            _ => Self::ApiError { code, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_response_generic_error() {
        let body = r#"{
            "status": "error",
            "errors": [
                {
                    "errorCode": "UDAPI1021",
                    "message": "Quantity should be greater than 0",
                    "propertyPath": "quantity"
                }
            ]
        }"#;

        let err = UpstoxRestError::from_api_response(body);
        match err {
            UpstoxRestError::ApiError { code, message } => {
                assert_eq!(code, "UDAPI1021");
                assert_eq!(message, "Quantity should be greater than 0");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_api_response_invalid_token() {
        let body = r#"{
            "status": "error",
            "errors": [
                {
                    "errorCode": "UDAPI100050",
                    "message": "Invalid token used to access API"
                }
            ]
        }"#;

        let err = UpstoxRestError::from_api_response(body);
        assert!(matches!(err, UpstoxRestError::InvalidToken(_)));
    }

    #[test]
    fn test_from_api_response_unparseable_body() {
        let err = UpstoxRestError::from_api_response("<html>502 Bad Gateway</html>");
        assert!(matches!(err, UpstoxRestError::Parse(_)));
    }

    #[test]
    fn test_from_rest_upgrades_api_envelope() {
        let rest_err = RestError::HttpError {
            status: 400,
            message: r#"{"status":"error","errors":[{"errorCode":"UDAPI1052","message":"Invalid instrument key"}]}"#
                .to_string(),
        };

        let err = UpstoxRestError::from_rest(rest_err);
        assert!(matches!(err, UpstoxRestError::ApiError { .. }));
    }

    #[test]
    fn test_from_rest_keeps_plain_http_error() {
        let rest_err = RestError::HttpError {
            status: 503,
            message: "Service Unavailable".to_string(),
        };

        let err = UpstoxRestError::from_rest(rest_err);
        assert!(matches!(err, UpstoxRestError::Rest(_)));
    }

    #[test]
    fn test_from_rest_keeps_transport_errors() {
        let err = UpstoxRestError::from_rest(RestError::Timeout);
        assert!(matches!(err, UpstoxRestError::Rest(RestError::Timeout)));
    }
}
