use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::domain::{CertificateId, TenantId};
use super::intake::CertificateSubmission;
use super::repository::{CertificateRepository, RepositoryError};
use super::service::{CertificateOutcomeService, CertificateServiceError};

/// Router builder exposing preview and record endpoints for certificate outcomes.
pub fn certificate_router<R>(service: Arc<CertificateOutcomeService<R>>) -> Router
where
    R: CertificateRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/certificates/outcome/preview",
            post(preview_submission_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/certificates",
            post(register_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/certificates/:certificate_id",
            get(status_handler::<R>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/certificates/:certificate_id/outcome",
            get(preview_handler::<R>).put(record_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn preview_submission_handler<R>(
    State(service): State<Arc<CertificateOutcomeService<R>>>,
    axum::Json(submission): axum::Json<CertificateSubmission>,
) -> Response
where
    R: CertificateRepository + 'static,
{
    match service.preview_submission(submission) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<CertificateOutcomeService<R>>>,
    Path(tenant_id): Path<String>,
    axum::Json(submission): axum::Json<CertificateSubmission>,
) -> Response
where
    R: CertificateRepository + 'static,
{
    match service.register(TenantId(tenant_id), submission) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<CertificateOutcomeService<R>>>,
    Path((tenant_id, certificate_id)): Path<(String, String)>,
) -> Response
where
    R: CertificateRepository + 'static,
{
    match service.get(&TenantId(tenant_id), &CertificateId(certificate_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preview_handler<R>(
    State(service): State<Arc<CertificateOutcomeService<R>>>,
    Path((tenant_id, certificate_id)): Path<(String, String)>,
) -> Response
where
    R: CertificateRepository + 'static,
{
    match service.preview(&TenantId(tenant_id), &CertificateId(certificate_id)) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<R>(
    State(service): State<Arc<CertificateOutcomeService<R>>>,
    Path((tenant_id, certificate_id)): Path<(String, String)>,
) -> Response
where
    R: CertificateRepository + 'static,
{
    match service.record(
        &TenantId(tenant_id),
        &CertificateId(certificate_id),
        Utc::now(),
    ) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: CertificateServiceError) -> Response {
    let status = match &error {
        CertificateServiceError::Intake(_) | CertificateServiceError::Evaluation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CertificateServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CertificateServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CertificateServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
