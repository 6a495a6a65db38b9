//! Request handlers for the relay's HTTP surface.
//!
//! The webhook handler does receipt-time work only (authentication,
//! validation, duplicate suppression) and acknowledges the alert before
//! the pipeline runs, so TradingView never waits on the brokerage.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use model::{OrderLogEntry, OutcomeStatus, SignalOutcome, TradeAction, TradingSignal};
use relay::GateRejection;

use crate::state::AppState;

/// Webhook alert body.
///
/// Every field is optional so the handler, not the extractor, decides
/// the status code for each kind of malformed alert.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub token: Option<String>,
    pub symbol: Option<String>,
    pub action: Option<String>,
    pub quantity: Option<u32>,
    pub price: Option<Decimal>,
}

/// POST /webhook/tradingview
pub async fn webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        state.metrics.inc_signals_invalid();
        return (StatusCode::BAD_REQUEST, error_body("malformed payload")).into_response();
    };

    // Authentication precedes validation; an alert with a bad secret
    // learns nothing about what else was wrong with it
    let authorized = payload
        .token
        .as_deref()
        .is_some_and(|token| state.config.webhook_secret_matches(token));
    if !authorized {
        state.metrics.inc_signals_unauthorized();
        return (StatusCode::UNAUTHORIZED, error_body("unauthorized")).into_response();
    }

    let signal = match parse_signal(&payload) {
        Ok(signal) => signal,
        Err(message) => {
            state.metrics.inc_signals_invalid();
            return (StatusCode::BAD_REQUEST, error_body(message)).into_response();
        }
    };

    state.metrics.inc_signals_received();
    info!(
        symbol = %signal.symbol,
        action = %signal.action,
        quantity = signal.quantity,
        "Webhook signal received"
    );

    // The duplicate check runs before the ack so a repeated alert gets
    // an honest "skipped" response
    if state.tracker.check_and_record(&signal.symbol, signal.action) {
        state.metrics.inc_signals_skipped();
        let outcome = SignalOutcome::skipped(GateRejection::DuplicateSignal.to_string());
        let reason = outcome.reason.clone();
        warn!(symbol = %signal.symbol, "Duplicate signal skipped");

        let entry = OrderLogEntry::from_outcome(&signal, &outcome, Utc::now());
        let store = state.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.insert_order_log(&entry).await {
                warn!(error = %err, "Failed to persist order log entry");
            }
        });

        return Json(serde_json::json!({ "status": "skipped", "reason": reason }))
            .into_response();
    }

    let pipeline = state.pipeline.clone();
    let metrics = state.metrics.clone();
    tokio::spawn(async move {
        let outcome = pipeline.process(signal).await;
        match outcome.status {
            OutcomeStatus::Success => metrics.inc_orders_placed(),
            OutcomeStatus::Skipped => metrics.inc_signals_skipped(),
            OutcomeStatus::Failed => metrics.inc_orders_failed(),
        }
    });

    Json(serde_json::json!({ "status": "received" })).into_response()
}

/// Validate a webhook payload into a signal.
fn parse_signal(payload: &WebhookPayload) -> Result<TradingSignal, &'static str> {
    let symbol = payload
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or("missing symbol")?;

    let action = payload
        .action
        .as_deref()
        .and_then(TradeAction::parse)
        .ok_or("missing or invalid action")?;

    let quantity = payload
        .quantity
        .filter(|q| *q > 0)
        .ok_or("missing or invalid quantity")?;

    Ok(TradingSignal {
        symbol: symbol.to_string(),
        action,
        quantity,
        price: payload.price,
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    /// URL to send the browser back to after the broker login.
    pub redirect: Option<String>,
}

/// GET /auth/login
pub async fn auth_login(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> Response {
    let url = match state.broker.authorize_url() {
        Ok(url) => url,
        Err(err) => {
            warn!(error = %err, "Failed to build authorization URL");
            return (StatusCode::BAD_GATEWAY, error_body("authorization unavailable"))
                .into_response();
        }
    };

    // The caller's return URL rides through the OAuth state parameter
    let url = match params.redirect.as_deref().filter(|r| !r.is_empty()) {
        Some(return_to) => match append_query_param(&url, "state", return_to) {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "Authorization URL did not parse");
                return (StatusCode::BAD_GATEWAY, error_body("authorization unavailable"))
                    .into_response();
            }
        },
        None => url,
    };

    Redirect::temporary(&url).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// GET /auth/callback
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, error_body("missing authorization code"))
            .into_response();
    };

    let response = match state.broker.exchange_code(code).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "Authorization code exchange failed");
            return (StatusCode::BAD_GATEWAY, error_body("token exchange failed"))
                .into_response();
        }
    };

    let access_token = response.access_token;
    let refresh_token = response.refresh_token.unwrap_or_default();
    state
        .tokens
        .adopt(access_token.clone(), refresh_token)
        .await;
    info!("Broker login complete");

    match params.state.as_deref().filter(|s| !s.is_empty()) {
        Some(return_to) => match append_query_param(return_to, "access_token", &access_token) {
            Ok(url) => Redirect::temporary(&url).into_response(),
            Err(_) => (StatusCode::BAD_REQUEST, error_body("invalid return URL"))
                .into_response(),
        },
        None => Json(serde_json::json!({
            "status": "success",
            "message": "login complete"
        }))
        .into_response(),
    }
}

/// Re-serialize a URL with one extra query parameter.
fn append_query_param(url: &str, name: &str, value: &str) -> Result<String, url::ParseError> {
    let mut parsed = url::Url::parse(url)?;
    parsed.query_pairs_mut().append_pair(name, value);
    Ok(parsed.to_string())
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub instrument_type: Option<String>,
}

/// GET /api/search
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.as_deref().unwrap_or("");
    let results = state
        .directory
        .search(query, params.instrument_type.as_deref());

    Json(serde_json::json!({
        "status": "success",
        "count": results.len(),
        "data": results
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct VerifyPinPayload {
    pub pin: Option<String>,
}

/// POST /api/verify-pin
pub async fn verify_pin(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPinPayload>,
) -> Response {
    let Some(pin) = payload.pin.as_deref().filter(|p| !p.is_empty()) else {
        return (StatusCode::BAD_REQUEST, error_body("missing pin")).into_response();
    };

    let stored = match state.store.load_pin_digest().await {
        Ok(stored) => stored,
        Err(err) => {
            warn!(error = %err, "Failed to load PIN digest");
            return (StatusCode::BAD_GATEWAY, error_body("storage unavailable")).into_response();
        }
    };

    let valid = stored
        .as_deref()
        .is_some_and(|digest| auth::verify_pin(pin, digest));

    if valid {
        Json(serde_json::json!({ "status": "success", "valid": true })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "status": "error", "valid": false })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePinPayload {
    pub current_pin: Option<String>,
    pub new_pin: Option<String>,
}

/// POST /api/change-pin
///
/// The first call on a fresh deployment sets the PIN; after that the
/// current PIN must be supplied.
pub async fn change_pin(
    State(state): State<AppState>,
    Json(payload): Json<ChangePinPayload>,
) -> Response {
    let Some(new_pin) = payload.new_pin.as_deref().filter(|p| p.len() >= 4) else {
        return (
            StatusCode::BAD_REQUEST,
            error_body("new pin must be at least 4 characters"),
        )
            .into_response();
    };

    let stored = match state.store.load_pin_digest().await {
        Ok(stored) => stored,
        Err(err) => {
            warn!(error = %err, "Failed to load PIN digest");
            return (StatusCode::BAD_GATEWAY, error_body("storage unavailable")).into_response();
        }
    };

    if let Some(digest) = stored.as_deref() {
        let current_matches = payload
            .current_pin
            .as_deref()
            .is_some_and(|current| auth::verify_pin(current, digest));
        if !current_matches {
            return (StatusCode::UNAUTHORIZED, error_body("current pin incorrect"))
                .into_response();
        }
    }

    match state.store.save_pin_digest(&auth::hash_pin(new_pin)).await {
        Ok(()) => {
            info!("Dashboard PIN updated");
            Json(serde_json::json!({ "status": "success" })).into_response()
        }
        Err(err) => {
            warn!(error = %err, "Failed to save PIN digest");
            (StatusCode::BAD_GATEWAY, error_body("storage unavailable")).into_response()
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Response {
    let snapshot = state.metrics.snapshot();

    Json(serde_json::json!({
        "status": "ok",
        "environment": state.config.environment.to_string(),
        "instruments": state.directory.len(),
        "token_held": state.tokens.has_pair(),
        "metrics": snapshot
    }))
    .into_response()
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "error", "message": message }))
}
