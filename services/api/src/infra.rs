use certflow::workflows::certificates::{
    CertificateId, CertificateRecord, CertificateRepository, RepositoryError, TenantId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type RecordKey = (TenantId, CertificateId);

/// Process-local certificate store standing in for the CRM database.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCertificateRepository {
    records: Arc<Mutex<HashMap<RecordKey, CertificateRecord>>>,
}

impl InMemoryCertificateRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RecordKey, CertificateRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl CertificateRepository for InMemoryCertificateRepository {
    fn insert(&self, record: CertificateRecord) -> Result<CertificateRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let key = (record.tenant_id.clone(), record.certificate_id.clone());
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    fn update(&self, record: CertificateRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let key = (record.tenant_id.clone(), record.certificate_id.clone());
        match guard.get_mut(&key) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(
        &self,
        tenant_id: &TenantId,
        certificate_id: &CertificateId,
    ) -> Result<Option<CertificateRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .get(&(tenant_id.clone(), certificate_id.clone()))
            .cloned())
    }
}
