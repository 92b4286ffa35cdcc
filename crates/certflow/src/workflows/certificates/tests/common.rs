use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use crate::workflows::certificates::domain::{
    CertificateId, ChecklistAnswer, ChecklistResponse, CircuitReadings, MinorWorksReadings,
    Observation, ObservationCode, TenantId, TestData, TestResult,
};
use crate::workflows::certificates::evaluation::{EvaluationConfig, OutcomeEvaluator};
use crate::workflows::certificates::intake::{
    CertificateSubmission, ChecklistSubmission, ObservationSubmission, TestResultSubmission,
};
use crate::workflows::certificates::repository::{
    CertificateRecord, CertificateRepository, RepositoryError,
};
use crate::workflows::certificates::{certificate_router, CertificateOutcomeService};

pub(super) fn resolved_on() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn observation(code: ObservationCode, location: &str) -> Observation {
    Observation {
        code,
        location: location.to_string(),
        description: format!("{} noted", code.meaning()),
        resolved_at: None,
    }
}

pub(super) fn resolved(code: ObservationCode, location: &str) -> Observation {
    Observation {
        resolved_at: Some(resolved_on()),
        ..observation(code, location)
    }
}

pub(super) fn answer(section: &str, question: &str, response: ChecklistResponse) -> ChecklistAnswer {
    ChecklistAnswer {
        section: section.to_string(),
        question: question.to_string(),
        answer: response,
    }
}

pub(super) fn compliant_checklist() -> Vec<ChecklistAnswer> {
    vec![
        answer(
            "Consumer unit",
            "Adequacy of working space and accessibility",
            ChecklistResponse::Yes,
        ),
        answer(
            "Protection",
            "Presence of RCD protection for socket outlets",
            ChecklistResponse::Yes,
        ),
        answer(
            "Special locations",
            "Bath or shower supplementary bonding",
            ChecklistResponse::NotApplicable,
        ),
    ]
}

pub(super) fn circuit_readings() -> CircuitReadings {
    CircuitReadings {
        r1_plus_r2_ohms: Some(0.45),
        ring_r1_ohms: Some(0.31),
        ring_rn_ohms: Some(0.32),
        ring_r2_ohms: Some(0.52),
        insulation_resistance_mohm: Some(200.0),
        polarity_confirmed: Some(true),
        zs_ohms: Some(0.82),
        max_zs_ohms: Some(1.37),
        rcd_trip_time_ms: Some(18.0),
    }
}

pub(super) fn circuit(circuit_ref: &str) -> TestResult {
    TestResult {
        circuit_ref: circuit_ref.to_string(),
        data: TestData::Circuit(circuit_readings()),
    }
}

pub(super) fn circuit_with(
    circuit_ref: &str,
    adjust: impl FnOnce(&mut CircuitReadings),
) -> TestResult {
    let mut readings = circuit_readings();
    adjust(&mut readings);
    TestResult {
        circuit_ref: circuit_ref.to_string(),
        data: TestData::Circuit(readings),
    }
}

pub(super) fn minor_works_readings() -> MinorWorksReadings {
    MinorWorksReadings {
        r1_plus_r2_ohms: Some(0.38),
        insulation_resistance_mohm: Some(299.0),
        polarity_confirmed: Some(true),
        zs_ohms: Some(0.64),
        max_zs_ohms: Some(1.37),
        rcd_trip_time_ms: Some(22.0),
    }
}

pub(super) fn minor_works(circuit_ref: &str) -> TestResult {
    TestResult {
        circuit_ref: circuit_ref.to_string(),
        data: TestData::MinorWorks(minor_works_readings()),
    }
}

pub(super) fn evaluation_config() -> EvaluationConfig {
    EvaluationConfig::default()
}

pub(super) fn evaluator() -> OutcomeEvaluator {
    OutcomeEvaluator::new(evaluation_config())
}

pub(super) fn tenant() -> TenantId {
    TenantId("sparks-electrical".to_string())
}

pub(super) fn circuit_data() -> Map<String, Value> {
    match json!({
        "insulation_resistance_mohm": 200.0,
        "polarity_confirmed": true,
        "zs_ohms": 0.82,
        "max_zs_ohms": 1.37,
        "rcd_trip_time_ms": 18.0
    }) {
        Value::Object(map) => map,
        _ => unreachable!("object literal"),
    }
}

pub(super) fn submission() -> CertificateSubmission {
    CertificateSubmission {
        certificate_type: "EICR".to_string(),
        observations: vec![ObservationSubmission {
            code: "C2".to_string(),
            location: "Kitchen CU".to_string(),
            description: "No RCD protection on socket circuits".to_string(),
            resolved_at: None,
        }],
        checklist: vec![ChecklistSubmission {
            section: "Protection".to_string(),
            question: "Presence of main protective bonding".to_string(),
            answer: "yes".to_string(),
        }],
        test_results: vec![TestResultSubmission {
            circuit_ref: "1".to_string(),
            data: circuit_data(),
        }],
        test_schedule_csv: None,
    }
}

pub(super) fn clean_submission() -> CertificateSubmission {
    CertificateSubmission {
        observations: Vec::new(),
        ..submission()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<(TenantId, CertificateId), CertificateRecord>>>,
}

impl CertificateRepository for MemoryRepository {
    fn insert(&self, record: CertificateRecord) -> Result<CertificateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let key = (record.tenant_id.clone(), record.certificate_id.clone());
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    fn update(&self, record: CertificateRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let key = (record.tenant_id.clone(), record.certificate_id.clone());
        if guard.contains_key(&key) {
            guard.insert(key, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(
        &self,
        tenant_id: &TenantId,
        certificate_id: &CertificateId,
    ) -> Result<Option<CertificateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(&(tenant_id.clone(), certificate_id.clone()))
            .cloned())
    }
}

pub(super) struct ConflictRepository;

impl CertificateRepository for ConflictRepository {
    fn insert(&self, _record: CertificateRecord) -> Result<CertificateRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: CertificateRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(
        &self,
        _tenant_id: &TenantId,
        _certificate_id: &CertificateId,
    ) -> Result<Option<CertificateRecord>, RepositoryError> {
        Ok(None)
    }
}

pub(super) struct UnavailableRepository;

impl CertificateRepository for UnavailableRepository {
    fn insert(&self, _record: CertificateRecord) -> Result<CertificateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: CertificateRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _tenant_id: &TenantId,
        _certificate_id: &CertificateId,
    ) -> Result<Option<CertificateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    CertificateOutcomeService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = CertificateOutcomeService::new(repository.clone(), evaluation_config());
    (service, repository)
}

pub(super) fn certificate_router_with_service(
    service: CertificateOutcomeService<MemoryRepository>,
) -> axum::Router {
    certificate_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
