use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

use ism_admissions::workflows::admissions::{
    admissions_router, AdmissionsApi, ApplicationRepository, GradeSource, SessionStore,
};

use crate::infra::AppState;

/// Admissions API plus the operational probes.
pub(crate) fn with_admissions_routes<R, G, S>(api: Arc<AdmissionsApi<R, G, S>>) -> Router
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    admissions_router(api)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    use axum::body::Body;
    use axum::http::Request;
    use ism_admissions::config::AdmissionsConfig;
    use ism_admissions::workflows::admissions::FixedGradeSource;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use crate::infra::build_api;

    fn app(ready: bool) -> Router {
        let api = build_api(&AdmissionsConfig::default(), FixedGradeSource::new(15.0, "S2"))
            .expect("api builds");
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_admissions_routes(api).layer(Extension(state))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = app(false)
            .oneshot(get_request("/ready"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(get_request("/ready"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let router = app(true);

        let response = router
            .clone()
            .oneshot(get_request("/health"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(get_request("/metrics"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"text/plain; version=0.0.4"[..])
        );
    }

    #[tokio::test]
    async fn admissions_routes_are_mounted_with_seed_data() {
        let response = app(true)
            .oneshot(get_request("/api/v1/applications?status=complete"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body bytes");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        let records = payload.as_array().expect("array payload");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["number"], "ISM-2026-0006");
    }
}
