use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CertificateId, CertificateInputs, TenantId};
use super::evaluation::OutcomeResult;

/// Repository record holding a certificate's inputs and its last recorded verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub tenant_id: TenantId,
    pub certificate_id: CertificateId,
    pub inputs: CertificateInputs,
    pub verdict: Option<RecordedVerdict>,
}

/// Verdict persisted onto the parent certificate in record mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedVerdict {
    pub result: OutcomeResult,
    pub explanation: String,
    pub recorded_at: DateTime<Utc>,
}

impl CertificateRecord {
    pub fn status_view(&self) -> CertificateStatusView {
        let verdict = self.verdict.as_ref();
        CertificateStatusView {
            certificate_id: self.certificate_id.clone(),
            certificate_type: self.inputs.certificate_type.label(),
            outcome: verdict.map(|verdict| verdict.result.outcome.label()),
            reason: verdict.map(|verdict| verdict.result.reason.code()),
            explanation: verdict
                .map(|verdict| verdict.explanation.clone())
                .unwrap_or_else(|| "pending evaluation".to_string()),
            recorded_at: verdict.map(|verdict| verdict.recorded_at),
        }
    }
}

/// Tenant-scoped storage abstraction so the service can be exercised in isolation.
pub trait CertificateRepository: Send + Sync {
    fn insert(&self, record: CertificateRecord) -> Result<CertificateRecord, RepositoryError>;
    fn update(&self, record: CertificateRecord) -> Result<(), RepositoryError>;
    fn fetch(
        &self,
        tenant_id: &TenantId,
        certificate_id: &CertificateId,
    ) -> Result<Option<CertificateRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Summary of a certificate's verdict state exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateStatusView {
    pub certificate_id: CertificateId,
    pub certificate_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}
