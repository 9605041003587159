//! HTTP routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::error::ConvertError;
use crate::metrics::SharedMetrics;
use crate::models::{ConversionRequest, ConversionResponse, HealthResponse};
use crate::service::ConversionService;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversionService>,
    pub metrics: SharedMetrics,
}

impl AppState {
    pub fn new(service: Arc<ConversionService>) -> Self {
        let metrics = service.metrics().clone();
        Self { service, metrics }
    }
}

/// Build the application router.
///
/// `/metrics` is only routed when `metrics_enabled` is set.
pub fn create_router(state: AppState, metrics_enabled: bool) -> Router {
    let mut router = Router::new()
        .route("/convert", post(convert))
        .route("/health", get(health));

    if metrics_enabled {
        router = router.route("/metrics", get(metrics));
    }

    router.with_state(state)
}

async fn convert(
    State(state): State<AppState>,
    Json(request): Json<ConversionRequest>,
) -> Result<Json<ConversionResponse>, ConvertError> {
    state.service.convert(request).await.map(Json)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use rateway_common::{CurrencyCode, RateTable};
    use rateway_fx::{InMemoryRateCache, MockRateFetcher, RateCache};
    use rateway_ledger::InMemoryConversionLog;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        cache: Arc<InMemoryRateCache>,
        fetcher: Arc<MockRateFetcher>,
        log: Arc<InMemoryConversionLog>,
    }

    fn test_app(metrics_enabled: bool) -> TestApp {
        let cache = Arc::new(InMemoryRateCache::new());
        let fetcher = Arc::new(MockRateFetcher::new());
        let log = Arc::new(InMemoryConversionLog::new());

        fetcher.set_table("usd", RateTable::new().with_rate("eur", 0.9));

        let service = ConversionService::new(
            cache.clone(),
            fetcher.clone(),
            log.clone(),
            Arc::new(Metrics::new()),
        );
        let router = create_router(AppState::new(Arc::new(service)), metrics_enabled);

        TestApp {
            router,
            cache,
            fetcher,
            log,
        }
    }

    async fn post_convert(router: &Router, body: Value) -> Response {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/convert")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_convert_success() {
        let app = test_app(true);

        let response = post_convert(
            &app.router,
            json!({"amount": 100, "base_currency": "usd", "target_currency": "eur"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "base_currency": "USD",
                "target_currency": "EUR",
                "amount": 100.0,
                "converted_amount": 90.0,
                "rate": 0.9
            })
        );
        assert_eq!(app.log.len(), 1);
    }

    #[tokio::test]
    async fn test_convert_mixed_case() {
        let app = test_app(true);

        for (base, target) in [("USD", "EUR"), ("Usd", "eUr"), ("usd", "eur")] {
            let response = post_convert(
                &app.router,
                json!({"amount": 10, "base_currency": base, "target_currency": target}),
            )
            .await;

            let body = body_json(response).await;
            assert_eq!(body["base_currency"], "USD");
            assert_eq!(body["target_currency"], "EUR");
            assert_eq!(body["rate"], 0.9);
        }

        assert_eq!(app.fetcher.calls(), 1);
        assert!(app
            .log
            .records()
            .iter()
            .all(|r| r.base_currency == "USD" && r.target_currency == "EUR"));
    }

    #[tokio::test]
    async fn test_convert_invalid_target() {
        let app = test_app(true);

        let response = post_convert(
            &app.router,
            json!({"amount": 100, "base_currency": "usd", "target_currency": "xyz"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Invalid target currency"})
        );
        assert!(app.log.is_empty());
    }

    #[tokio::test]
    async fn test_convert_upstream_failure() {
        let app = test_app(true);
        app.fetcher.fail_with_status(Some(500));

        let response = post_convert(
            &app.router,
            json!({"amount": 100, "base_currency": "usd", "target_currency": "eur"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Failed to fetch exchange rates"})
        );
        assert!(app.log.is_empty());
        assert!(app
            .cache
            .get(&CurrencyCode::from("usd"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_convert_persistence_failure() {
        let app = test_app(true);
        app.log.set_failing(true);

        let response = post_convert(
            &app.router,
            json!({"amount": 100, "base_currency": "usd", "target_currency": "eur"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body.get("converted_amount").is_none());
    }

    #[tokio::test]
    async fn test_convert_numeric_string_amount() {
        let app = test_app(true);

        let response = post_convert(
            &app.router,
            json!({"amount": "100", "base_currency": "usd", "target_currency": "eur"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["amount"], 100.0);
        assert_eq!(body["converted_amount"], 90.0);
        assert_eq!(app.log.len(), 1);
    }

    #[tokio::test]
    async fn test_convert_trims_currency_codes() {
        let app = test_app(true);

        let response = post_convert(
            &app.router,
            json!({"amount": 100, "base_currency": " usd", "target_currency": "eur "}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["base_currency"], "USD");
        assert_eq!(body["target_currency"], "EUR");
        assert_eq!(app.log.records()[0].base_currency, "USD");
    }

    #[tokio::test]
    async fn test_convert_rejects_malformed_body() {
        let app = test_app(true);

        let response = post_convert(
            &app.router,
            json!({"amount": "a lot", "base_currency": "usd", "target_currency": "eur"}),
        )
        .await;

        assert!(response.status().is_client_error());
        assert_eq!(app.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(true);

        let response = app
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = test_app(true);
        post_convert(
            &app.router,
            json!({"amount": 1, "base_currency": "usd", "target_currency": "eur"}),
        )
        .await;

        let response = app
            .router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("rateway_conversions_success 1"));
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let app = test_app(false);

        let response = app
            .router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
