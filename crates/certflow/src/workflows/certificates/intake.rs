use std::collections::HashSet;
use std::io::Cursor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{
    CertificateInputs, CertificateType, ChecklistAnswer, ChecklistResponse, CircuitReadings,
    MinorWorksReadings, Observation, ObservationCode, TestData, TestResult,
};
use super::schedule::{ScheduleImportError, TestScheduleImporter};

/// Certificate bundle as supplied by the surrounding application, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateSubmission {
    pub certificate_type: String,
    #[serde(default)]
    pub observations: Vec<ObservationSubmission>,
    #[serde(default)]
    pub checklist: Vec<ChecklistSubmission>,
    #[serde(default)]
    pub test_results: Vec<TestResultSubmission>,
    /// Instrument CSV export appended to `test_results`.
    #[serde(default)]
    pub test_schedule_csv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSubmission {
    pub code: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistSubmission {
    #[serde(default)]
    pub section: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultSubmission {
    pub circuit_ref: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Input-shape errors raised at the evaluation boundary.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("unknown certificate type '{0}' (expected EICR, EIC or MWC)")]
    UnknownCertificateType(String),
    #[error("unknown observation code '{code}'")]
    UnknownObservationCode { code: String },
    #[error("checklist question is blank in section '{section}'")]
    MissingChecklistQuestion { section: String },
    #[error("unknown checklist answer '{answer}' for '{question}'")]
    UnknownChecklistAnswer { question: String, answer: String },
    #[error("test result is missing its circuit reference")]
    MissingCircuitReference,
    #[error("circuit {0} has more than one test result")]
    DuplicateCircuit(String),
    #[error("circuit {circuit_ref}: malformed test data: {source}")]
    MalformedTestData {
        circuit_ref: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("circuit {circuit_ref}: test data does not use the {} schedule", .certificate_type.label())]
    ScheduleMismatch {
        circuit_ref: String,
        certificate_type: CertificateType,
    },
    #[error("circuit {circuit_ref}: {measurement} reading {value} is not a valid measurement")]
    InvalidReading {
        circuit_ref: String,
        measurement: &'static str,
        value: f32,
    },
    #[error(transparent)]
    TestSchedule(#[from] ScheduleImportError),
}

/// Guard responsible for producing `CertificateInputs` instances.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Convert an inbound submission into validated evaluator inputs.
    pub fn inputs_from_submission(
        &self,
        submission: CertificateSubmission,
    ) -> Result<CertificateInputs, IntakeViolation> {
        let certificate_type = CertificateType::parse_label(&submission.certificate_type)
            .ok_or_else(|| IntakeViolation::UnknownCertificateType(submission.certificate_type))?;

        let observations = submission
            .observations
            .into_iter()
            .map(observation_from_submission)
            .collect::<Result<Vec<_>, _>>()?;

        let checklist = submission
            .checklist
            .into_iter()
            .map(answer_from_submission)
            .collect::<Result<Vec<_>, _>>()?;

        let mut test_results = submission
            .test_results
            .into_iter()
            .map(|result| test_result_from_submission(certificate_type, result))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(csv) = submission.test_schedule_csv {
            let imported =
                TestScheduleImporter::from_reader(Cursor::new(csv.into_bytes()), certificate_type)?;
            test_results.extend(imported);
        }

        self.validate_test_results(certificate_type, &test_results)?;

        Ok(CertificateInputs {
            certificate_type,
            observations,
            checklist,
            test_results,
        })
    }

    /// Shape checks shared by submitted and imported test results.
    pub fn validate_test_results(
        &self,
        certificate_type: CertificateType,
        results: &[TestResult],
    ) -> Result<(), IntakeViolation> {
        let mut seen = HashSet::new();
        for result in results {
            if result.circuit_ref.trim().is_empty() {
                return Err(IntakeViolation::MissingCircuitReference);
            }
            if !seen.insert(result.circuit_ref.as_str()) {
                return Err(IntakeViolation::DuplicateCircuit(result.circuit_ref.clone()));
            }
            if !certificate_type.accepts(&result.data) {
                return Err(IntakeViolation::ScheduleMismatch {
                    circuit_ref: result.circuit_ref.clone(),
                    certificate_type,
                });
            }
            for (measurement, value) in result.data.numeric_readings() {
                if let Some(value) = value {
                    if !value.is_finite() || value < 0.0 {
                        return Err(IntakeViolation::InvalidReading {
                            circuit_ref: result.circuit_ref.clone(),
                            measurement: measurement.label(),
                            value,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn observation_from_submission(
    submission: ObservationSubmission,
) -> Result<Observation, IntakeViolation> {
    let code = ObservationCode::parse_label(&submission.code).ok_or_else(|| {
        IntakeViolation::UnknownObservationCode {
            code: submission.code.clone(),
        }
    })?;

    Ok(Observation {
        code,
        location: submission.location.trim().to_string(),
        description: submission.description.trim().to_string(),
        resolved_at: submission.resolved_at,
    })
}

fn answer_from_submission(
    submission: ChecklistSubmission,
) -> Result<ChecklistAnswer, IntakeViolation> {
    if submission.question.trim().is_empty() {
        return Err(IntakeViolation::MissingChecklistQuestion {
            section: submission.section,
        });
    }

    let answer = ChecklistResponse::parse_label(&submission.answer).ok_or_else(|| {
        IntakeViolation::UnknownChecklistAnswer {
            question: submission.question.clone(),
            answer: submission.answer.clone(),
        }
    })?;

    Ok(ChecklistAnswer {
        section: submission.section.trim().to_string(),
        question: submission.question.trim().to_string(),
        answer,
    })
}

fn test_result_from_submission(
    certificate_type: CertificateType,
    submission: TestResultSubmission,
) -> Result<TestResult, IntakeViolation> {
    let circuit_ref = submission.circuit_ref.trim().to_string();
    let fields = Value::Object(submission.data);

    let data = match certificate_type {
        CertificateType::Eicr | CertificateType::Eic => {
            serde_json::from_value::<CircuitReadings>(fields).map(TestData::Circuit)
        }
        CertificateType::Mwc => {
            serde_json::from_value::<MinorWorksReadings>(fields).map(TestData::MinorWorks)
        }
    }
    .map_err(|source| IntakeViolation::MalformedTestData {
        circuit_ref: circuit_ref.clone(),
        source,
    })?;

    Ok(TestResult { circuit_ref, data })
}
