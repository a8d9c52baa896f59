use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use scheme_engine::error::AppError;
use scheme_engine::workflows::scheme::{BatchSummary, SchemeBatchProcessor};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct ComputeRequest {
    pub(crate) csv: String,
    /// Overrides the configured flexi setting for this request only.
    #[serde(default)]
    pub(crate) force_flexi: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ComputeResponse {
    pub(crate) csv: String,
    pub(crate) summary: BatchSummary,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/schemes/compute", post(compute_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn compute_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ComputeRequest>,
) -> Result<Json<ComputeResponse>, AppError> {
    let ComputeRequest { csv, force_flexi } = payload;

    let settings = state.settings.as_ref().clone();
    let force_flexi = force_flexi.unwrap_or(settings.force_flexi);
    let processor = SchemeBatchProcessor::new(settings.with_force_flexi(force_flexi));
    let (csv, summary) = processor.process_csv(&csv)?;

    Ok(Json(ComputeResponse { csv, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use scheme_engine::workflows::scheme::SchemeSettings;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const EXPORT: &str = "\
refName,bs1-legalName,bs2-charge-2
\"Gold (e0) 12M 2.50% PF 1%\",Rupeek Royal,
";

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            settings: Arc::new(SchemeSettings::default()),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn compute_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/schemes/compute")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = readiness_endpoint(Extension(state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await, json!({ "status": "initializing" }));

        let response = readiness_endpoint(Extension(state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn compute_endpoint_rewrites_rows() {
        let request = ComputeRequest {
            csv: EXPORT.to_string(),
            force_flexi: None,
        };

        let Json(body) = compute_endpoint(Extension(state(true)), Json(request))
            .await
            .expect("compute succeeds");

        assert_eq!(body.summary.rows_read, 1);
        assert_eq!(body.summary.rows_updated, 1);
        assert!(body.csv.contains("Rupeek Royal"));
        assert!(body.csv.contains("processing-fee"));
        assert!(!body.csv.contains("maxPercentUnsecure"));
    }

    #[tokio::test]
    async fn compute_route_honours_request_flexi_override() {
        let app = router().layer(Extension(state(true)));
        let response = app
            .oneshot(compute_request(json!({ "csv": EXPORT, "force_flexi": true })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["summary"]["rows_updated"], json!(1));
        let csv = body["csv"].as_str().expect("csv text");
        assert!(csv.contains("maxPercentUnsecure"));
    }

    #[tokio::test]
    async fn compute_route_rejects_exports_without_identifiers() {
        let app = router().layer(Extension(state(true)));
        let response = app
            .oneshot(compute_request(json!({ "csv": "name,tenure\nx,6\n" })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .is_some_and(|message| message.contains("refName")));
    }

    #[tokio::test]
    async fn health_route_is_always_ok() {
        let app = router().layer(Extension(state(false)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
