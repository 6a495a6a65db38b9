mod common;

use axum::http::{header, StatusCode};
use common::*;
use model::OutcomeStatus;
use storage::RecordStore;
use tower::ServiceExt;

fn webhook_body(token: &str, symbol: &str, action: &str, quantity: u32) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "symbol": symbol,
        "action": action,
        "quantity": quantity,
        "price": 200.0
    })
}

mod webhook_auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_wrong_secret_returns_401_without_side_effects() {
        let app = create_test_app().await;

        let request = json_request(
            "/webhook/tradingview",
            webhook_body("wrong-secret", "NSE:SBIN", "BUY", 10),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Nothing was spawned, so a short grace period is enough to
        // catch an accidental pipeline run
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert_eq!(app.broker.position_count(), 0);
        assert_eq!(app.broker.order_count(), 0);
        assert!(app.store.order_logs().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_returns_401() {
        let app = create_test_app().await;

        let request = json_request(
            "/webhook/tradingview",
            serde_json::json!({ "symbol": "NSE:SBIN", "action": "BUY", "quantity": 10 }),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(app.store.order_logs().is_empty());
    }
}

mod webhook_validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_symbol_returns_400() {
        let app = create_test_app().await;

        let request = json_request(
            "/webhook/tradingview",
            serde_json::json!({ "token": TEST_SECRET, "action": "BUY", "quantity": 10 }),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "missing symbol");
    }

    #[tokio::test]
    async fn test_unknown_action_returns_400() {
        let app = create_test_app().await;

        let request = json_request(
            "/webhook/tradingview",
            serde_json::json!({
                "token": TEST_SECRET,
                "symbol": "NSE:SBIN",
                "action": "HOLD",
                "quantity": 10
            }),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "missing or invalid action");
    }

    #[tokio::test]
    async fn test_zero_quantity_returns_400() {
        let app = create_test_app().await;

        let request = json_request(
            "/webhook/tradingview",
            webhook_body(TEST_SECRET, "NSE:SBIN", "BUY", 0),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let app = create_test_app().await;

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/webhook/tradingview")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

mod webhook_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_valid_signal_is_acknowledged_and_placed() {
        let app = create_test_app().await;

        let request = json_request(
            "/webhook/tradingview",
            webhook_body(TEST_SECRET, "NSE:SBIN", "BUY", 10),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "received");

        wait_until("order placement", || app.broker.order_count() == 1).await;

        let placed = app.broker.placed.lock();
        assert_eq!(placed[0].instrument_token, "NSE_EQ|SBIN");
        assert_eq!(placed[0].quantity, 10);
        drop(placed);

        wait_until("order log entry", || !app.store.order_logs().is_empty()).await;
        let logs = app.store.order_logs();
        assert_eq!(logs[0].status, OutcomeStatus::Success);
        assert_eq!(logs[0].order_id.as_deref(), Some("240825010331445"));
    }

    #[tokio::test]
    async fn test_duplicate_signal_is_skipped() {
        let app = create_test_app().await;
        let body = webhook_body(TEST_SECRET, "NSE:SBIN", "BUY", 10);

        let first = app
            .router
            .clone()
            .oneshot(json_request("/webhook/tradingview", body.clone()))
            .await
            .unwrap();
        assert_eq!(body_json(first).await["status"], "received");
        wait_until("first order", || app.broker.order_count() == 1).await;

        let second = app
            .router
            .clone()
            .oneshot(json_request("/webhook/tradingview", body))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let second_body = body_json(second).await;
        assert_eq!(second_body["status"], "skipped");
        assert_eq!(second_body["reason"], "duplicate signal");

        wait_until("skip log entry", || app.store.order_logs().len() == 2).await;
        assert_eq!(app.broker.order_count(), 1);

        let logs = app.store.order_logs();
        assert!(logs
            .iter()
            .any(|entry| entry.status == OutcomeStatus::Skipped
                && entry.reason == "duplicate signal"));
    }

    #[tokio::test]
    async fn test_sell_signal_exits_long_position() {
        let broker = MockBroker::new().with_positions(vec![position("SBIN", 10)]);
        let app = create_test_app_with_broker(broker).await;

        let request = json_request(
            "/webhook/tradingview",
            webhook_body(TEST_SECRET, "NSE:SBIN", "SELL", 10),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        wait_until("exit order placement", || app.broker.order_count() == 1).await;
    }

    #[tokio::test]
    async fn test_buy_into_long_position_is_skipped() {
        let broker = MockBroker::new().with_positions(vec![position("SBIN", 10)]);
        let app = create_test_app_with_broker(broker).await;

        let request = json_request(
            "/webhook/tradingview",
            webhook_body(TEST_SECRET, "NSE:SBIN", "BUY", 10),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();

        // The ack happens before the gate runs; the rejection shows up
        // in the order log instead
        assert_eq!(body_json(response).await["status"], "received");

        wait_until("gate rejection log", || !app.store.order_logs().is_empty()).await;
        let logs = app.store.order_logs();
        assert_eq!(logs[0].status, OutcomeStatus::Skipped);
        assert!(logs[0].reason.contains("long position"));
        assert_eq!(app.broker.order_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_order_is_recorded() {
        let app = create_test_app_with_broker(MockBroker::new().failing_order()).await;

        let request = json_request(
            "/webhook/tradingview",
            webhook_body(TEST_SECRET, "NSE:SBIN", "BUY", 10),
        );
        app.router.clone().oneshot(request).await.unwrap();

        wait_until("failure log", || !app.store.order_logs().is_empty()).await;
        let logs = app.store.order_logs();
        assert_eq!(logs[0].status, OutcomeStatus::Failed);
        assert!(logs[0].reason.contains("order placement failed"));
    }
}

mod auth_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_redirects_to_broker() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request("/auth/login"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://broker.example.com/login/authorization/dialog"));
    }

    #[tokio::test]
    async fn test_login_carries_redirect_in_state_param() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request(
                "/auth/login?redirect=https%3A%2F%2Fdash.example.com%2F",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.contains("state=https%3A%2F%2Fdash.example.com%2F"));
    }

    #[tokio::test]
    async fn test_callback_exchanges_code_and_persists_tokens() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request("/auth/callback?code=abc123"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(app.broker.exchange_calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        let record = app.store.load_token_pair().await.unwrap().unwrap();
        assert_eq!(record.access_token, "exchanged-access");
        assert_eq!(record.refresh_token, "exchanged-refresh");
    }

    #[tokio::test]
    async fn test_callback_without_code_returns_400() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request("/auth/callback"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_redirects_to_state_url_with_token() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request(
                "/auth/callback?code=abc123&state=https%3A%2F%2Fdash.example.com%2F",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://dash.example.com/"));
        assert!(location.contains("access_token=exchanged-access"));
    }
}

mod pin_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_change_pin_sets_and_verifies() {
        let app = create_test_app().await;

        let set = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/change-pin",
                serde_json::json!({ "new_pin": "4321" }),
            ))
            .await
            .unwrap();
        assert_eq!(set.status(), StatusCode::OK);

        let good = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/verify-pin",
                serde_json::json!({ "pin": "4321" }),
            ))
            .await
            .unwrap();
        assert_eq!(good.status(), StatusCode::OK);
        assert_eq!(body_json(good).await["valid"], true);

        let bad = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/verify-pin",
                serde_json::json!({ "pin": "0000" }),
            ))
            .await
            .unwrap();
        assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(bad).await["valid"], false);
    }

    #[tokio::test]
    async fn test_change_pin_requires_current_once_set() {
        let app = create_test_app().await;

        app.router
            .clone()
            .oneshot(json_request(
                "/api/change-pin",
                serde_json::json!({ "new_pin": "4321" }),
            ))
            .await
            .unwrap();

        let no_current = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/change-pin",
                serde_json::json!({ "new_pin": "9876" }),
            ))
            .await
            .unwrap();
        assert_eq!(no_current.status(), StatusCode::UNAUTHORIZED);

        let wrong_current = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/change-pin",
                serde_json::json!({ "current_pin": "1111", "new_pin": "9876" }),
            ))
            .await
            .unwrap();
        assert_eq!(wrong_current.status(), StatusCode::UNAUTHORIZED);

        let correct = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/change-pin",
                serde_json::json!({ "current_pin": "4321", "new_pin": "9876" }),
            ))
            .await
            .unwrap();
        assert_eq!(correct.status(), StatusCode::OK);

        let verify = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/verify-pin",
                serde_json::json!({ "pin": "9876" }),
            ))
            .await
            .unwrap();
        assert_eq!(verify.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_short_new_pin_rejected() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/change-pin",
                serde_json::json!({ "new_pin": "12" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_pin_before_any_set_is_unauthorized() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "/api/verify-pin",
                serde_json::json!({ "pin": "1234" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_finds_symbol() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request("/api/search?q=SBIN"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["trading_symbol"], "SBIN");
        assert_eq!(body["data"][0]["instrument_key"], "NSE_EQ|SBIN");
    }

    #[tokio::test]
    async fn test_search_without_query_returns_empty() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request("/api/search"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["count"], 0);
    }
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_status() {
        let app = create_test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["instruments"], 3);
        assert_eq!(body["token_held"], true);
        assert_eq!(body["metrics"]["signals_received"], 0);
    }
}
