//! Certificate outcome engine: intake validation, per-type rule evaluation, explanation
//! text, and the service/router seam that previews or records verdicts for a tenant.

pub mod domain;
pub mod evaluation;
pub mod explanation;
pub mod intake;
pub mod repository;
pub mod router;
pub mod schedule;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CertificateId, CertificateInputs, CertificateType, ChecklistAnswer, ChecklistResponse,
    CircuitReadings, Measurement, MinorWorksReadings, Observation, ObservationCode, TenantId,
    TestData, TestResult,
};
pub use evaluation::{
    compute_outcome, EvaluationConfig, EvaluationError, FindingEffect, FindingSource, Outcome,
    OutcomeDetails, OutcomeEvaluator, OutcomeFinding, OutcomeReason, OutcomeResult,
    MIN_EXPLANATION_MAX_CHARS,
};
pub use explanation::{explain_outcome, explain_outcome_within, NO_OUTSTANDING_ISSUES};
pub use intake::{
    CertificateSubmission, ChecklistSubmission, IntakeGuard, IntakeViolation,
    ObservationSubmission, TestResultSubmission,
};
pub use repository::{
    CertificateRecord, CertificateRepository, CertificateStatusView, RecordedVerdict,
    RepositoryError,
};
pub use router::certificate_router;
pub use schedule::{ScheduleImportError, TestScheduleImporter};
pub use service::{CertificateOutcomeService, CertificateServiceError, OutcomeReport};
