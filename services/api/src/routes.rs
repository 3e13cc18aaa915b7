use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use crsel_site::submissions::{
    submission_router, CareerApplication, ContactSubmission, RecordStore, SiteState,
};
use serde_json::json;

pub(crate) fn with_site_routes<C, K>(state: SiteState<C, K>) -> Router
where
    C: RecordStore<ContactSubmission> + 'static,
    K: RecordStore<CareerApplication> + 'static,
{
    submission_router(state)
        .route("/", get(root_status))
        .route("/api/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn root_status() -> Json<serde_json::Value> {
    Json(json!({ "activeStatus": true, "error": false }))
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
