mod config;
mod policy;
mod rules;

pub use config::{
    EvaluationConfig, DEFAULT_EXPLANATION_MAX_CHARS, DEFAULT_MAX_RCD_TRIP_TIME_MS,
    DEFAULT_MIN_INSULATION_RESISTANCE_MOHM, DEFAULT_RING_TOLERANCE_OHMS, DEFAULT_ZS_LIMIT_FACTOR,
    MIN_EXPLANATION_MAX_CHARS,
};
pub use policy::{FindingEffect, Outcome, OutcomeReason};

pub(crate) use rules::{display_location, observation_weight};

use super::domain::{
    CertificateInputs, CertificateType, ChecklistAnswer, Measurement, Observation,
    ObservationCode, TestResult,
};
use super::explanation::explain_outcome_within;
use policy::decide_outcome;
use serde::{Deserialize, Serialize};

/// Stateless evaluator applying the per-type rule table with fixed thresholds.
#[derive(Debug, Clone, Default)]
pub struct OutcomeEvaluator {
    config: EvaluationConfig,
}

impl OutcomeEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        certificate_type: CertificateType,
        observations: &[Observation],
        checklist: &[ChecklistAnswer],
        test_results: &[TestResult],
    ) -> Result<OutcomeResult, EvaluationError> {
        let rule_set = rules::rule_set_for(certificate_type);

        let mut findings = rules::observation_findings(observations);
        findings.extend(rules::checklist_findings(rule_set, checklist));
        findings.extend(rules::reading_findings(
            rule_set,
            &self.config,
            test_results,
        )?);

        let verdict = decide_outcome(rule_set, &findings);

        Ok(OutcomeResult {
            certificate_type,
            outcome: verdict.outcome,
            reason: verdict.reason,
            caveat: verdict.caveat,
            details: OutcomeDetails { findings },
        })
    }

    pub fn evaluate_inputs(
        &self,
        inputs: &CertificateInputs,
    ) -> Result<OutcomeResult, EvaluationError> {
        self.evaluate(
            inputs.certificate_type,
            &inputs.observations,
            &inputs.checklist,
            &inputs.test_results,
        )
    }

    /// Explanation text bounded by the configured display length.
    pub fn explain(&self, result: &OutcomeResult, observations: &[Observation]) -> String {
        explain_outcome_within(result, observations, self.config.explanation_max_chars)
    }
}

/// Evaluate with the default thresholds.
pub fn compute_outcome(
    certificate_type: CertificateType,
    observations: &[Observation],
    checklist: &[ChecklistAnswer],
    test_results: &[TestResult],
) -> Result<OutcomeResult, EvaluationError> {
    OutcomeEvaluator::default().evaluate(certificate_type, observations, checklist, test_results)
}

/// Verdict, rule code, and audit trail for one certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeResult {
    pub certificate_type: CertificateType,
    pub outcome: Outcome,
    pub reason: OutcomeReason,
    /// Set when a caveat finding (further investigation, recorded limitation) accompanies
    /// the verdict.
    pub caveat: bool,
    pub details: OutcomeDetails,
}

impl OutcomeResult {
    pub fn is_failing(&self) -> bool {
        self.outcome.is_failing()
    }

    pub fn headline(&self) -> String {
        format!("{}: {}", self.outcome.title(), self.reason.summary())
    }
}

/// Contributing findings in evaluation order: observations, checklist, test results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDetails {
    pub findings: Vec<OutcomeFinding>,
}

impl OutcomeDetails {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn with_effect(&self, effect: FindingEffect) -> impl Iterator<Item = &OutcomeFinding> {
        self.findings
            .iter()
            .filter(move |finding| finding.effect == effect)
    }
}

/// Discrete contribution to a verdict, kept for audits and rendered certificates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeFinding {
    pub source: FindingSource,
    pub effect: FindingEffect,
    pub reason: OutcomeReason,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingSource {
    Observation {
        code: ObservationCode,
        location: String,
    },
    Checklist {
        section: String,
        question: String,
    },
    TestResult {
        circuit_ref: String,
        measurement: Measurement,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("circuit {circuit_ref}: test data does not match the {} schedule", .certificate_type.label())]
    TestDataMismatch {
        circuit_ref: String,
        certificate_type: CertificateType,
    },
}
