use super::common::*;
use crate::workflows::certificates::domain::{CertificateId, TenantId};
use crate::workflows::certificates::evaluation::{Outcome, OutcomeReason};
use crate::workflows::certificates::intake::IntakeViolation;
use crate::workflows::certificates::repository::{CertificateRepository, RepositoryError};
use crate::workflows::certificates::{CertificateOutcomeService, CertificateServiceError};
use std::sync::Arc;

#[test]
fn register_stores_pending_certificate() {
    let (service, repository) = build_service();

    let record = service
        .register(tenant(), submission())
        .expect("certificate registered");

    assert!(record.certificate_id.0.starts_with("eicr-"));
    assert!(record.verdict.is_none());
    let stored = repository
        .fetch(&tenant(), &record.certificate_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);
    assert_eq!(stored.status_view().explanation, "pending evaluation");
}

#[test]
fn register_propagates_intake_violations() {
    let (service, _) = build_service();
    let mut bundle = submission();
    bundle.certificate_type = "XYZ".to_string();

    match service.register(tenant(), bundle) {
        Err(CertificateServiceError::Intake(IntakeViolation::UnknownCertificateType(_))) => {}
        other => panic!("expected intake violation, got {other:?}"),
    }
}

#[test]
fn preview_submission_is_stateless() {
    let (service, _) = build_service();

    let report = service
        .preview_submission(submission())
        .expect("preview succeeds");

    assert_eq!(report.result.outcome, Outcome::Unsatisfactory);
    assert_eq!(report.result.reason, OutcomeReason::C2Present);
    assert!(report.explanation.contains("Kitchen CU"));
}

#[test]
fn preview_does_not_persist_the_verdict() {
    let (service, repository) = build_service();
    let record = service
        .register(tenant(), submission())
        .expect("certificate registered");

    let report = service
        .preview(&tenant(), &record.certificate_id)
        .expect("preview succeeds");
    assert_eq!(report.result.outcome, Outcome::Unsatisfactory);

    let stored = repository
        .fetch(&tenant(), &record.certificate_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert!(stored.verdict.is_none());
}

#[test]
fn record_persists_verdict_onto_certificate() {
    let (service, repository) = build_service();
    let record = service
        .register(tenant(), clean_submission())
        .expect("certificate registered");

    let report = service
        .record(&tenant(), &record.certificate_id, resolved_on())
        .expect("record succeeds");
    assert_eq!(report.result.outcome, Outcome::Satisfactory);

    let stored = repository
        .fetch(&tenant(), &record.certificate_id)
        .expect("fetch succeeds")
        .expect("record present");
    let verdict = stored.verdict.as_ref().expect("verdict recorded");
    assert_eq!(verdict.result, report.result);
    assert_eq!(verdict.explanation, report.explanation);
    assert_eq!(verdict.recorded_at, resolved_on());

    let view = stored.status_view();
    assert_eq!(view.outcome, Some("satisfactory"));
    assert_eq!(view.reason, Some("all_clear"));
}

#[test]
fn certificates_are_scoped_to_their_tenant() {
    let (service, _) = build_service();
    let record = service
        .register(tenant(), submission())
        .expect("certificate registered");

    let other = TenantId("rival-electrics".to_string());
    match service.preview(&other, &record.certificate_id) {
        Err(CertificateServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(matches!(
        service.record(&other, &record.certificate_id, resolved_on()),
        Err(CertificateServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&tenant(), &CertificateId("eicr-999999".to_string())) {
        Err(CertificateServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn repository_failures_surface_to_callers() {
    let service = CertificateOutcomeService::new(Arc::new(UnavailableRepository), evaluation_config());

    assert!(matches!(
        service.register(tenant(), submission()),
        Err(CertificateServiceError::Repository(RepositoryError::Unavailable(_)))
    ));

    let conflicted = CertificateOutcomeService::new(Arc::new(ConflictRepository), evaluation_config());
    assert!(matches!(
        conflicted.register(tenant(), submission()),
        Err(CertificateServiceError::Repository(RepositoryError::Conflict))
    ));
}
