use crate::infra::AppState;
use affittochiaro::cv::{
    cv_router, format, CvCompleteness, CvRepository, CvService, ReliabilityScore, TenantCv,
    TenantId,
};
use affittochiaro::error::AppError;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) tenant_id: TenantId,
    pub(crate) completeness: CvCompleteness,
    pub(crate) reliability: ReliabilityScore,
    pub(crate) summary: String,
}

pub(crate) fn with_cv_routes<R>(service: Arc<CvService<R>>) -> axum::Router
where
    R: CvRepository + 'static,
{
    cv_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/cv/score", axum::routing::post(score_endpoint))
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

/// Score a CV sent in the body without storing it.
pub(crate) async fn score_endpoint(body: String) -> Result<Json<ScoreResponse>, AppError> {
    let cv = TenantCv::from_json_str(&body)?;
    let completeness = cv.completeness();
    let reliability = completeness.reliability();
    let summary = format::render_summary(&completeness);

    Ok(Json(ScoreResponse {
        tenant_id: cv.profile.tenant_id,
        completeness,
        reliability,
        summary,
    }))
}
