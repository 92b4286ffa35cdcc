use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::certificates::router::{record_handler, register_handler};
use crate::workflows::certificates::CertificateOutcomeService;

fn json_request(method: &str, uri: &str, body: &impl serde::Serialize) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializes")))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn preview_route_returns_report() {
    let (service, _) = build_service();
    let router = certificate_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/certificates/outcome/preview",
            &submission(),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["result"]["outcome"], "unsatisfactory");
    assert_eq!(payload["result"]["reason"], "c2_present");
    assert_eq!(payload["result"]["caveat"], false);
    assert_eq!(
        payload["result"]["details"]["findings"][0]["source"]["kind"],
        "observation"
    );
    assert!(payload["explanation"]
        .as_str()
        .expect("explanation string")
        .contains("Kitchen CU"));
}

#[tokio::test]
async fn preview_route_rejects_unknown_types() {
    let (service, _) = build_service();
    let router = certificate_router_with_service(service);
    let mut bundle = submission();
    bundle.certificate_type = "PIR".to_string();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/certificates/outcome/preview",
            &bundle,
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error string")
        .contains("PIR"));
}

#[tokio::test]
async fn register_then_record_round_trip() {
    let (service, _) = build_service();
    let router = certificate_router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/tenants/sparks-electrical/certificates",
            &submission(),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["explanation"], "pending evaluation");
    assert!(payload.get("outcome").is_none());
    let certificate_id = payload["certificate_id"]
        .as_str()
        .expect("certificate id")
        .to_string();

    let outcome_uri =
        format!("/api/v1/tenants/sparks-electrical/certificates/{certificate_id}/outcome");
    let response = router
        .clone()
        .oneshot(empty_request("PUT", &outcome_uri))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let status_uri = format!("/api/v1/tenants/sparks-electrical/certificates/{certificate_id}");
    let response = router
        .oneshot(empty_request("GET", &status_uri))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload: Value = read_json_body(response).await;
    assert_eq!(payload["outcome"], "unsatisfactory");
    assert_eq!(payload["reason"], "c2_present");
    assert!(payload.get("recorded_at").is_some());
}

#[tokio::test]
async fn outcome_route_hides_other_tenants_certificates() {
    let (service, _) = build_service();
    let record = service
        .register(tenant(), submission())
        .expect("certificate registered");
    let router = certificate_router_with_service(service);

    let uri = format!(
        "/api/v1/tenants/rival-electrics/certificates/{}/outcome",
        record.certificate_id.0
    );
    let response = router
        .oneshot(empty_request("GET", &uri))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_handler_returns_conflict_on_duplicate() {
    let service = Arc::new(CertificateOutcomeService::new(
        Arc::new(ConflictRepository),
        evaluation_config(),
    ));

    let response = register_handler::<ConflictRepository>(
        State(service),
        Path("sparks-electrical".to_string()),
        axum::Json(submission()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn record_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(CertificateOutcomeService::new(
        Arc::new(UnavailableRepository),
        evaluation_config(),
    ));

    let response = record_handler::<UnavailableRepository>(
        State(service),
        Path(("sparks-electrical".to_string(), "eicr-000001".to_string())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
