use super::super::domain::{
    CertificateType, ChecklistAnswer, ChecklistResponse, CircuitReadings, Measurement,
    MinorWorksReadings, Observation, ObservationCode, TestData, TestResult,
};
use super::config::EvaluationConfig;
use super::policy::{FindingEffect, Outcome, OutcomeReason};
use super::{EvaluationError, FindingSource, OutcomeFinding};

type ReadingRule = fn(
    CertificateType,
    &TestResult,
    &EvaluationConfig,
    &mut Vec<OutcomeFinding>,
) -> Result<(), EvaluationError>;

/// Rules applied to one certificate family.
pub(crate) struct RuleSet {
    pub certificate_type: CertificateType,
    pub clean: Outcome,
    pub failing: Outcome,
    pub checklist: ChecklistPolicy,
    pub readings: ReadingRule,
}

/// Effect of the non-binary schedule-of-inspections responses.
pub(crate) struct ChecklistPolicy {
    pub not_verified: FindingEffect,
    pub limitation: FindingEffect,
}

static EICR_RULES: RuleSet = RuleSet {
    certificate_type: CertificateType::Eicr,
    clean: Outcome::Satisfactory,
    failing: Outcome::Unsatisfactory,
    checklist: ChecklistPolicy {
        not_verified: FindingEffect::Caveat,
        limitation: FindingEffect::Caveat,
    },
    readings: circuit_schedule,
};

static EIC_RULES: RuleSet = RuleSet {
    certificate_type: CertificateType::Eic,
    clean: Outcome::Pass,
    failing: Outcome::Fail,
    checklist: ChecklistPolicy {
        not_verified: FindingEffect::Incomplete,
        limitation: FindingEffect::Incomplete,
    },
    readings: circuit_schedule,
};

static MWC_RULES: RuleSet = RuleSet {
    certificate_type: CertificateType::Mwc,
    clean: Outcome::Pass,
    failing: Outcome::Fail,
    checklist: ChecklistPolicy {
        not_verified: FindingEffect::Incomplete,
        limitation: FindingEffect::Incomplete,
    },
    readings: minor_works_schedule,
};

pub(crate) fn rule_set_for(certificate_type: CertificateType) -> &'static RuleSet {
    match certificate_type {
        CertificateType::Eicr => &EICR_RULES,
        CertificateType::Eic => &EIC_RULES,
        CertificateType::Mwc => &MWC_RULES,
    }
}

/// Effect and reason an unresolved observation carries; `None` codes carry nothing.
pub(crate) fn observation_weight(
    code: ObservationCode,
) -> Option<(FindingEffect, OutcomeReason)> {
    match code {
        ObservationCode::C1 => Some((FindingEffect::Failing, OutcomeReason::C1Present)),
        ObservationCode::C2 => Some((FindingEffect::Failing, OutcomeReason::C2Present)),
        ObservationCode::FI => Some((FindingEffect::Caveat, OutcomeReason::FurtherInvestigation)),
        ObservationCode::C3 => Some((
            FindingEffect::Advisory,
            OutcomeReason::ImprovementRecommended,
        )),
        ObservationCode::None => None,
    }
}

pub(crate) fn observation_findings(observations: &[Observation]) -> Vec<OutcomeFinding> {
    observations
        .iter()
        .filter(|observation| !observation.is_resolved())
        .filter_map(|observation| {
            let (effect, reason) = observation_weight(observation.code)?;

            Some(OutcomeFinding {
                source: FindingSource::Observation {
                    code: observation.code,
                    location: observation.location.clone(),
                },
                effect,
                reason,
                notes: format!(
                    "{} ({}) at {}: {}",
                    observation.code.label(),
                    observation.code.meaning(),
                    display_location(&observation.location),
                    observation.description.trim()
                ),
            })
        })
        .collect()
}

pub(crate) fn checklist_findings(
    rules: &RuleSet,
    answers: &[ChecklistAnswer],
) -> Vec<OutcomeFinding> {
    answers
        .iter()
        .filter_map(|answer| {
            let (effect, reason) = match answer.answer {
                ChecklistResponse::No => {
                    (FindingEffect::Failing, OutcomeReason::RequiredCheckFailed)
                }
                ChecklistResponse::NotVerified => (
                    rules.checklist.not_verified,
                    OutcomeReason::CheckNotVerified,
                ),
                ChecklistResponse::Limitation => (
                    rules.checklist.limitation,
                    OutcomeReason::LimitationRecorded,
                ),
                ChecklistResponse::Yes | ChecklistResponse::NotApplicable => return None,
            };

            Some(OutcomeFinding {
                source: FindingSource::Checklist {
                    section: answer.section.clone(),
                    question: answer.question.clone(),
                },
                effect,
                reason,
                notes: format!(
                    "{}: {} answered {}",
                    answer.section.trim(),
                    answer.question.trim(),
                    answer.answer.label()
                ),
            })
        })
        .collect()
}

pub(crate) fn reading_findings(
    rules: &RuleSet,
    config: &EvaluationConfig,
    results: &[TestResult],
) -> Result<Vec<OutcomeFinding>, EvaluationError> {
    let mut findings = Vec::new();
    for result in results {
        (rules.readings)(rules.certificate_type, result, config, &mut findings)?;
    }
    Ok(findings)
}

fn circuit_schedule(
    certificate_type: CertificateType,
    result: &TestResult,
    config: &EvaluationConfig,
    findings: &mut Vec<OutcomeFinding>,
) -> Result<(), EvaluationError> {
    let TestData::Circuit(readings) = &result.data else {
        return Err(EvaluationError::TestDataMismatch {
            circuit_ref: result.circuit_ref.clone(),
            certificate_type,
        });
    };
    let CircuitReadings {
        ring_r1_ohms,
        ring_rn_ohms,
        insulation_resistance_mohm,
        polarity_confirmed,
        zs_ohms,
        max_zs_ohms,
        rcd_trip_time_ms,
        ..
    } = readings;

    let mut checks = CircuitChecks::new(&result.circuit_ref, config, findings);
    checks.ring_continuity(*ring_r1_ohms, *ring_rn_ohms);
    checks.insulation_resistance(*insulation_resistance_mohm);
    checks.polarity(*polarity_confirmed);
    checks.earth_fault_loop(*zs_ohms, *max_zs_ohms);
    checks.rcd(*rcd_trip_time_ms);
    Ok(())
}

fn minor_works_schedule(
    certificate_type: CertificateType,
    result: &TestResult,
    config: &EvaluationConfig,
    findings: &mut Vec<OutcomeFinding>,
) -> Result<(), EvaluationError> {
    let TestData::MinorWorks(readings) = &result.data else {
        return Err(EvaluationError::TestDataMismatch {
            circuit_ref: result.circuit_ref.clone(),
            certificate_type,
        });
    };
    let MinorWorksReadings {
        r1_plus_r2_ohms,
        insulation_resistance_mohm,
        polarity_confirmed,
        zs_ohms,
        max_zs_ohms,
        rcd_trip_time_ms,
    } = readings;

    let mut checks = CircuitChecks::new(&result.circuit_ref, config, findings);
    if r1_plus_r2_ohms.is_none() {
        checks.missing(Measurement::R1PlusR2);
    }
    checks.insulation_resistance(*insulation_resistance_mohm);
    checks.polarity(*polarity_confirmed);
    checks.earth_fault_loop(*zs_ohms, *max_zs_ohms);
    checks.rcd(*rcd_trip_time_ms);
    Ok(())
}

struct CircuitChecks<'a> {
    circuit_ref: &'a str,
    config: &'a EvaluationConfig,
    findings: &'a mut Vec<OutcomeFinding>,
}

impl<'a> CircuitChecks<'a> {
    fn new(
        circuit_ref: &'a str,
        config: &'a EvaluationConfig,
        findings: &'a mut Vec<OutcomeFinding>,
    ) -> Self {
        Self {
            circuit_ref,
            config,
            findings,
        }
    }

    fn push(
        &mut self,
        measurement: Measurement,
        effect: FindingEffect,
        reason: OutcomeReason,
        detail: String,
    ) {
        self.findings.push(OutcomeFinding {
            source: FindingSource::TestResult {
                circuit_ref: self.circuit_ref.to_string(),
                measurement,
            },
            effect,
            reason,
            notes: format!("circuit {}: {}", self.circuit_ref, detail),
        });
    }

    fn missing(&mut self, measurement: Measurement) {
        self.push(
            measurement,
            FindingEffect::Incomplete,
            OutcomeReason::ReadingMissing,
            format!("{} not recorded", measurement.label()),
        );
    }

    fn out_of_tolerance(&mut self, measurement: Measurement, detail: String) {
        self.push(
            measurement,
            FindingEffect::Failing,
            OutcomeReason::TestOutOfTolerance,
            detail,
        );
    }

    fn ring_continuity(&mut self, r1: Option<f32>, rn: Option<f32>) {
        let (Some(r1), Some(rn)) = (r1, rn) else {
            return;
        };
        let tolerance = self.config.ring_end_to_end_tolerance_ohms;
        if (r1 - rn).abs() > tolerance {
            self.out_of_tolerance(
                Measurement::RingContinuity,
                format!(
                    "ring end-to-end r1 {r1:.2} Ω and rn {rn:.2} Ω differ by more than {tolerance:.2} Ω"
                ),
            );
        }
    }

    fn insulation_resistance(&mut self, value: Option<f32>) {
        let Some(value) = value else {
            self.missing(Measurement::InsulationResistance);
            return;
        };
        let minimum = self.config.minimum_insulation_resistance_mohm;
        if value < minimum {
            self.out_of_tolerance(
                Measurement::InsulationResistance,
                format!("insulation resistance {value:.2} MΩ below minimum {minimum:.2} MΩ"),
            );
        }
    }

    fn polarity(&mut self, confirmed: Option<bool>) {
        match confirmed {
            None => self.missing(Measurement::Polarity),
            Some(false) => {
                self.out_of_tolerance(Measurement::Polarity, "polarity incorrect".to_string())
            }
            Some(true) => {}
        }
    }

    fn earth_fault_loop(&mut self, zs: Option<f32>, max_zs: Option<f32>) {
        let Some(zs) = zs else {
            self.missing(Measurement::EarthFaultLoopImpedance);
            return;
        };
        let Some(max_zs) = max_zs else {
            return;
        };
        let limit = self.config.zs_limit_for(max_zs);
        if zs > limit {
            self.out_of_tolerance(
                Measurement::EarthFaultLoopImpedance,
                format!(
                    "Zs {zs:.2} Ω exceeds {limit:.2} Ω ({:.0}% of max {max_zs:.2} Ω)",
                    self.config.zs_limit_factor * 100.0
                ),
            );
        }
    }

    fn rcd(&mut self, trip_time_ms: Option<f32>) {
        let Some(trip_time) = trip_time_ms else {
            return;
        };
        let maximum = self.config.maximum_rcd_trip_time_ms;
        if trip_time > maximum {
            self.out_of_tolerance(
                Measurement::RcdTripTime,
                format!("RCD trip time {trip_time:.0} ms exceeds {maximum:.0} ms"),
            );
        }
    }
}

pub(crate) fn display_location(location: &str) -> &str {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        "unspecified location"
    } else {
        trimmed
    }
}
