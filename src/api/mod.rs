// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{models::FaucetResponse, state::AppState};

pub mod faucet;
pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(faucet::dispense))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        faucet::dispense,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            FaucetResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Faucet", description = "Token dispensing"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use super::*;
    use crate::faucet::Faucet;
    use crate::ledger::mock::MockLedger;
    use crate::ledger::Seed;
    use crate::storage::{CachePaths, WalletDefaults, WalletStore};

    const SEED: &str =
        "NLRMWYYCDUVF9XQJYDFNNYTBSKPFKNHSDZWLLJOEDMDFRTDAZEPKYIHCTURJYYHHYQBMMYO9HOCBFDKSK";
    const RECIPIENT: &str =
        "RECIPIENT99999999999999999999999999999999999999999999999999999999999999999999999A";

    struct TestApp {
        router: Router,
        ledger: Arc<MockLedger>,
        store: Arc<WalletStore>,
        _dir: tempfile::TempDir,
    }

    fn app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            WalletStore::open(
                CachePaths::new(dir.path()),
                WalletDefaults {
                    seed: Seed::new(SEED).unwrap(),
                    default_balance: 20_000,
                },
            )
            .unwrap(),
        );
        let ledger = Arc::new(MockLedger::new());
        let faucet = Arc::new(Faucet::new(
            ledger.clone(),
            store.clone(),
            Duration::ZERO,
            CancellationToken::new(),
        ));
        let state = AppState::new(faucet, store.clone(), ledger.clone());
        TestApp {
            router: router(state),
            ledger,
            store,
            _dir: dir,
        }
    }

    async fn call(app: &TestApp, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    #[tokio::test]
    async fn missing_address_is_reported_with_200() {
        let app = app();

        for uri in ["/", "/?address=", "/?amount=5"] {
            let (status, _, body) = call(&app, uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(
                body,
                serde_json::json!({"success": false, "error": "no address"}),
                "{uri}"
            );
        }
        assert!(app.ledger.with(|s| s.balance_queries.is_empty()));
    }

    #[tokio::test]
    async fn funded_wallet_dispenses() {
        let app = app();
        app.ledger.fund(0, 100_000);

        let (status, headers, body) = call(&app, &format!("/?address={RECIPIENT}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"success": true}));
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(app.store.load().unwrap().key_index, 1);
    }

    #[tokio::test]
    async fn amount_parameter_is_forwarded() {
        let app = app();
        app.ledger.fund(0, 100_000);

        call(&app, &format!("/?address={RECIPIENT}&amount=1234")).await;

        let (transfers, _) = app.ledger.with(|s| s.prepared[0].clone());
        assert_eq!(transfers[0].value, 1234);
    }

    #[tokio::test]
    async fn empty_wallet_reports_failure_with_200() {
        let app = app();

        let (status, _, body) = call(&app, &format!("/?address={RECIPIENT}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"success": false}));
    }

    #[tokio::test]
    async fn unparseable_amount_is_forbidden() {
        let app = app();
        app.ledger.fund(0, 100_000);

        let (status, _, body) = call(&app, &format!("/?address={RECIPIENT}&amount=lots")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid amount"));
        assert!(app.ledger.with(|s| s.prepared.is_empty()));
    }

    #[tokio::test]
    async fn unparseable_query_is_forbidden_with_json_error() {
        let app = app();
        app.ledger.fund(0, 100_000);

        let (status, _, body) =
            call(&app, &format!("/?address={RECIPIENT}&address={RECIPIENT}")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("duplicate field"), "{message}");
        assert!(app.ledger.with(|s| s.prepared.is_empty()));
    }

    #[tokio::test]
    async fn malformed_address_is_forbidden() {
        let app = app();

        let (status, _, body) = call(&app, "/?address=hello").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid address: hello");
    }

    #[tokio::test]
    async fn submission_failure_is_forbidden_with_message() {
        let app = app();
        app.ledger.fund(0, 100_000);
        app.ledger.with(|s| s.fail_send = true);

        let (status, _, body) = call(&app, &format!("/?address={RECIPIENT}")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Node error: attachToTangle failed");
        assert_eq!(app.store.load().unwrap().key_index, 0);
    }

    #[tokio::test]
    async fn prepare_failure_is_forbidden_and_keeps_index() {
        let app = app();
        app.ledger.fund(0, 100_000);
        app.ledger.with(|s| s.fail_prepare = true);

        let (status, _, body) = call(&app, &format!("/?address={RECIPIENT}")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Internal error: prepare failed");
        assert!(app.ledger.with(|s| s.submitted.is_empty()));
        assert_eq!(app.store.load().unwrap().key_index, 0);
    }

    #[tokio::test]
    async fn incoming_request_id_is_propagated() {
        let app = app();
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = app();
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .header("origin", "https://example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let app = app();
        let (status, _, body) = call(&app, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_checks_cache_and_node() {
        let app = app();

        let (status, _, body) = call(&app, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["cache"], "ok");
        assert_eq!(body["checks"]["node"], "ok");

        app.ledger.with(|s| s.fail_node_info = true);
        let (status, _, body) = call(&app, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["node"], "unreachable");
    }

    #[tokio::test]
    async fn openapi_document_lists_the_faucet_route() {
        let app = app();
        let (status, _, body) = call(&app, "/api-doc/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/"]["get"].is_object());
        assert!(body["paths"]["/health/ready"]["get"].is_object());
    }
}
