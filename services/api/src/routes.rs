use crate::infra::AppState;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use certflow::error::AppError;
use certflow::workflows::certificates::{
    certificate_router, CertificateOutcomeService, CertificateRepository,
    CertificateServiceError, CertificateType, IntakeViolation, TestResult, TestScheduleImporter,
};
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleImportQuery {
    pub(crate) certificate_type: String,
}

pub(crate) fn with_certificate_routes<R>(
    service: Arc<CertificateOutcomeService<R>>,
) -> axum::Router
where
    R: CertificateRepository + 'static,
{
    certificate_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/certificates/schedule",
            axum::routing::post(schedule_import_endpoint),
        )
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

/// Parses an instrument CSV export into typed test results for the requested family.
pub(crate) async fn schedule_import_endpoint(
    Query(query): Query<ScheduleImportQuery>,
    body: String,
) -> Result<Json<Vec<TestResult>>, AppError> {
    let certificate_type = CertificateType::parse_label(&query.certificate_type).ok_or_else(|| {
        CertificateServiceError::from(IntakeViolation::UnknownCertificateType(
            query.certificate_type.clone(),
        ))
    })?;

    let results = TestScheduleImporter::from_reader(Cursor::new(body.into_bytes()), certificate_type)?;
    debug!(
        certificate_type = certificate_type.label(),
        circuits = results.len(),
        "test schedule imported"
    );
    Ok(Json(results))
}
