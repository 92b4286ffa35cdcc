use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{CertificateId, CertificateInputs, CertificateType, TenantId};
use super::evaluation::{EvaluationConfig, EvaluationError, OutcomeEvaluator, OutcomeResult};
use super::intake::{CertificateSubmission, IntakeGuard, IntakeViolation};
use super::repository::{
    CertificateRecord, CertificateRepository, RecordedVerdict, RepositoryError,
};

/// Verdict plus display text, as returned to callers and renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub result: OutcomeResult,
    pub explanation: String,
}

/// Service composing the intake guard, repository, and outcome evaluator.
pub struct CertificateOutcomeService<R> {
    guard: Arc<IntakeGuard>,
    repository: Arc<R>,
    evaluator: Arc<OutcomeEvaluator>,
}

static CERTIFICATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_certificate_id(certificate_type: CertificateType) -> CertificateId {
    let id = CERTIFICATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CertificateId(format!(
        "{}-{id:06}",
        certificate_type.label().to_ascii_lowercase()
    ))
}

impl<R> CertificateOutcomeService<R>
where
    R: CertificateRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: EvaluationConfig) -> Self {
        Self {
            guard: Arc::new(IntakeGuard),
            repository,
            evaluator: Arc::new(OutcomeEvaluator::new(config)),
        }
    }

    pub fn evaluator(&self) -> &OutcomeEvaluator {
        &self.evaluator
    }

    /// Validate and store a certificate bundle for later evaluation.
    pub fn register(
        &self,
        tenant_id: TenantId,
        submission: CertificateSubmission,
    ) -> Result<CertificateRecord, CertificateServiceError> {
        let inputs = self.validate(submission)?;
        let record = CertificateRecord {
            tenant_id,
            certificate_id: next_certificate_id(inputs.certificate_type),
            inputs,
            verdict: None,
        };

        let stored = self.repository.insert(record)?;
        debug!(
            tenant = %stored.tenant_id.0,
            certificate = %stored.certificate_id.0,
            "certificate registered"
        );
        Ok(stored)
    }

    /// Evaluate a submission without touching the repository.
    pub fn preview_submission(
        &self,
        submission: CertificateSubmission,
    ) -> Result<OutcomeReport, CertificateServiceError> {
        let inputs = self.validate(submission)?;
        self.report(&inputs)
    }

    /// Evaluate a stored certificate without persisting the verdict.
    pub fn preview(
        &self,
        tenant_id: &TenantId,
        certificate_id: &CertificateId,
    ) -> Result<OutcomeReport, CertificateServiceError> {
        let record = self.get(tenant_id, certificate_id)?;
        let report = self.report(&record.inputs)?;
        debug!(
            tenant = %tenant_id.0,
            certificate = %certificate_id.0,
            outcome = report.result.outcome.label(),
            "certificate outcome previewed"
        );
        Ok(report)
    }

    /// Evaluate a stored certificate and persist the verdict onto it.
    pub fn record(
        &self,
        tenant_id: &TenantId,
        certificate_id: &CertificateId,
        recorded_at: DateTime<Utc>,
    ) -> Result<OutcomeReport, CertificateServiceError> {
        let mut record = self.get(tenant_id, certificate_id)?;
        let report = self.report(&record.inputs)?;

        record.verdict = Some(RecordedVerdict {
            result: report.result.clone(),
            explanation: report.explanation.clone(),
            recorded_at,
        });
        self.repository.update(record)?;

        info!(
            tenant = %tenant_id.0,
            certificate = %certificate_id.0,
            outcome = report.result.outcome.label(),
            reason = report.result.reason.code(),
            caveat = report.result.caveat,
            "certificate outcome recorded"
        );
        Ok(report)
    }

    /// Fetch a certificate owned by `tenant_id`.
    pub fn get(
        &self,
        tenant_id: &TenantId,
        certificate_id: &CertificateId,
    ) -> Result<CertificateRecord, CertificateServiceError> {
        let record = self
            .repository
            .fetch(tenant_id, certificate_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn validate(
        &self,
        submission: CertificateSubmission,
    ) -> Result<CertificateInputs, CertificateServiceError> {
        self.guard
            .inputs_from_submission(submission)
            .map_err(|violation| {
                warn!(error = %violation, "certificate submission rejected");
                CertificateServiceError::from(violation)
            })
    }

    fn report(&self, inputs: &CertificateInputs) -> Result<OutcomeReport, CertificateServiceError> {
        let result = self.evaluator.evaluate_inputs(inputs)?;
        let explanation = self.evaluator.explain(&result, &inputs.observations);
        Ok(OutcomeReport {
            result,
            explanation,
        })
    }
}

/// Error raised by the outcome service.
#[derive(Debug, thiserror::Error)]
pub enum CertificateServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
