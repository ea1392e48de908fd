use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::completeness::{CvCompleteness, ReliabilityScore};
use super::directory::DirectoryQuery;
use super::domain::{
    CvGuarantor, CvRentalEntry, PresentationVideo, RecordId, TenantId, TenantPreferences,
    TenantProfile, TenantReference,
};
use super::repository::{CvRepository, RepositoryError};
use super::service::{
    CvService, CvServiceError, CvView, DocumentReview, DocumentUpload, ProfileUpdate,
};

type SharedService<R> = State<Arc<CvService<R>>>;

/// Router builder exposing the tenant CV endpoints.
pub fn cv_router<R>(service: Arc<CvService<R>>) -> Router
where
    R: CvRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/tenants",
            get(directory_handler::<R>).post(register_handler::<R>),
        )
        .route("/api/v1/tenants/:tenant_id/cv", get(cv_handler::<R>))
        .route(
            "/api/v1/tenants/:tenant_id/cv/completeness",
            get(completeness_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/profile",
            put(profile_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/preferences",
            put(preferences_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/video",
            put(video_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/documents",
            post(add_document_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/documents/:record_id",
            put(review_document_handler::<R>).delete(remove_document_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/rental-history",
            post(add_rental_entry_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/rental-history/:record_id",
            put(update_rental_entry_handler::<R>).delete(delete_rental_entry_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/guarantors",
            post(add_guarantor_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/guarantors/:record_id",
            put(update_guarantor_handler::<R>).delete(delete_guarantor_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/references",
            post(add_reference_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/cv/references/:record_id",
            put(update_reference_handler::<R>).delete(delete_reference_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletenessResponse {
    pub(crate) tenant_id: TenantId,
    pub(crate) completeness: CvCompleteness,
    pub(crate) reliability: ReliabilityScore,
}

pub(crate) async fn directory_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<DirectoryQuery>,
) -> Response
where
    R: CvRepository + 'static,
{
    match service.directory(&query) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): SharedService<R>,
    Json(profile): Json<TenantProfile>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(service.register(profile), StatusCode::CREATED)
}

pub(crate) async fn cv_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(service.view(&TenantId(tenant_id)), StatusCode::OK)
}

pub(crate) async fn completeness_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
) -> Response
where
    R: CvRepository + 'static,
{
    let tenant_id = TenantId(tenant_id);
    match service.completeness(&tenant_id) {
        Ok(completeness) => {
            let reliability = completeness.reliability();
            let body = CompletenessResponse {
                tenant_id,
                completeness,
                reliability,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn profile_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.update_profile(&TenantId(tenant_id), update),
        StatusCode::OK,
    )
}

pub(crate) async fn preferences_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
    Json(preferences): Json<Option<TenantPreferences>>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.set_preferences(&TenantId(tenant_id), preferences),
        StatusCode::OK,
    )
}

pub(crate) async fn video_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
    Json(video): Json<Option<PresentationVideo>>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.set_video(&TenantId(tenant_id), video),
        StatusCode::OK,
    )
}

pub(crate) async fn add_document_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.add_document(&TenantId(tenant_id), upload),
        StatusCode::CREATED,
    )
}

pub(crate) async fn review_document_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
    Json(review): Json<DocumentReview>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.review_document(&TenantId(tenant_id), &RecordId(record_id), review),
        StatusCode::OK,
    )
}

pub(crate) async fn remove_document_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.remove_document(&TenantId(tenant_id), &RecordId(record_id)),
        StatusCode::OK,
    )
}

pub(crate) async fn add_rental_entry_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
    Json(entry): Json<CvRentalEntry>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.add_rental_entry(&TenantId(tenant_id), entry),
        StatusCode::CREATED,
    )
}

pub(crate) async fn update_rental_entry_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
    Json(entry): Json<CvRentalEntry>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.update_rental_entry(&TenantId(tenant_id), &RecordId(record_id), entry),
        StatusCode::OK,
    )
}

pub(crate) async fn delete_rental_entry_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.delete_rental_entry(&TenantId(tenant_id), &RecordId(record_id)),
        StatusCode::OK,
    )
}

pub(crate) async fn add_guarantor_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
    Json(guarantor): Json<CvGuarantor>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.add_guarantor(&TenantId(tenant_id), guarantor),
        StatusCode::CREATED,
    )
}

pub(crate) async fn update_guarantor_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
    Json(guarantor): Json<CvGuarantor>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.update_guarantor(&TenantId(tenant_id), &RecordId(record_id), guarantor),
        StatusCode::OK,
    )
}

pub(crate) async fn delete_guarantor_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.delete_guarantor(&TenantId(tenant_id), &RecordId(record_id)),
        StatusCode::OK,
    )
}

pub(crate) async fn add_reference_handler<R>(
    State(service): SharedService<R>,
    Path(tenant_id): Path<String>,
    Json(reference): Json<TenantReference>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.add_reference(&TenantId(tenant_id), reference),
        StatusCode::CREATED,
    )
}

pub(crate) async fn update_reference_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
    Json(reference): Json<TenantReference>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.update_reference(&TenantId(tenant_id), &RecordId(record_id), reference),
        StatusCode::OK,
    )
}

pub(crate) async fn delete_reference_handler<R>(
    State(service): SharedService<R>,
    Path((tenant_id, record_id)): Path<(String, String)>,
) -> Response
where
    R: CvRepository + 'static,
{
    respond(
        service.delete_reference(&TenantId(tenant_id), &RecordId(record_id)),
        StatusCode::OK,
    )
}

fn respond(result: Result<CvView, CvServiceError>, success: StatusCode) -> Response {
    match result {
        Ok(view) => (success, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: CvServiceError) -> Response {
    let status = match &error {
        CvServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CvServiceError::TenantNotFound(_)
        | CvServiceError::RecordNotFound { .. }
        | CvServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CvServiceError::DuplicateRecord { .. }
        | CvServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CvServiceError::Repository(RepositoryError::Unavailable(_)) => {
            warn!(error = %error, "cv repository unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
