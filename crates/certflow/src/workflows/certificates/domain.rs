use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for certificates held by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CertificateId(pub String);

/// Contracting company that owns a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

/// Certificate families supported by the outcome engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CertificateType {
    #[serde(rename = "EICR")]
    Eicr,
    #[serde(rename = "EIC")]
    Eic,
    #[serde(rename = "MWC")]
    Mwc,
}

impl CertificateType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Eicr, Self::Eic, Self::Mwc]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Eicr => "EICR",
            Self::Eic => "EIC",
            Self::Mwc => "MWC",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Eicr => "Electrical Installation Condition Report",
            Self::Eic => "Electrical Installation Certificate",
            Self::Mwc => "Minor Works Certificate",
        }
    }

    /// Parse a certificate label, ignoring case and surrounding whitespace.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
    }

    /// Whether a test-data variant belongs to this certificate family.
    pub fn accepts(self, data: &TestData) -> bool {
        matches!(
            (self, data),
            (Self::Eicr | Self::Eic, TestData::Circuit(_)) | (Self::Mwc, TestData::MinorWorks(_))
        )
    }
}

/// Observation classification codes from the wiring regulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationCode {
    C1,
    C2,
    C3,
    FI,
    #[serde(rename = "none")]
    None,
}

impl ObservationCode {
    /// Severity rank, higher is more severe: C1 > C2 > FI > C3 > none.
    pub const fn severity_rank(self) -> u8 {
        match self {
            Self::C1 => 4,
            Self::C2 => 3,
            Self::FI => 2,
            Self::C3 => 1,
            Self::None => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::C3 => "C3",
            Self::FI => "FI",
            Self::None => "none",
        }
    }

    pub const fn meaning(self) -> &'static str {
        match self {
            Self::C1 => "Danger present",
            Self::C2 => "Potentially dangerous",
            Self::C3 => "Improvement recommended",
            Self::FI => "Further investigation required",
            Self::None => "Not classified",
        }
    }

    pub const fn is_unsatisfactory(self) -> bool {
        matches!(self, Self::C1 | Self::C2)
    }

    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "C1" => Some(Self::C1),
            "C2" => Some(Self::C2),
            "C3" => Some(Self::C3),
            "FI" => Some(Self::FI),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }
}

/// Defect noted during inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub code: ObservationCode,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Observation {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// Response recorded against a schedule-of-inspections item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecklistResponse {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "n/a")]
    NotApplicable,
    #[serde(rename = "lim")]
    Limitation,
    #[serde(rename = "n/v")]
    NotVerified,
}

impl ChecklistResponse {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::NotApplicable => "n/a",
            Self::Limitation => "lim",
            Self::NotVerified => "n/v",
        }
    }

    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "✓" | "pass" => Some(Self::Yes),
            "no" | "n" | "✗" | "x" | "fail" => Some(Self::No),
            "n/a" | "na" => Some(Self::NotApplicable),
            "lim" | "limitation" => Some(Self::Limitation),
            "n/v" | "nv" | "not verified" => Some(Self::NotVerified),
            _ => None,
        }
    }
}

/// Response to a standard compliance question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistAnswer {
    pub section: String,
    pub question: String,
    pub answer: ChecklistResponse,
}

/// Per-circuit electrical measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub circuit_ref: String,
    pub data: TestData,
}

/// Readings keyed by the schedule layout of each certificate family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schedule", rename_all = "snake_case")]
pub enum TestData {
    /// Full schedule of test results used by EICR and EIC.
    Circuit(CircuitReadings),
    /// Reduced set recorded on a minor works certificate.
    MinorWorks(MinorWorksReadings),
}

impl TestData {
    /// Named numeric readings, in schedule column order.
    pub fn numeric_readings(&self) -> Vec<(Measurement, Option<f32>)> {
        match self {
            TestData::Circuit(readings) => vec![
                (Measurement::R1PlusR2, readings.r1_plus_r2_ohms),
                (Measurement::RingR1, readings.ring_r1_ohms),
                (Measurement::RingRn, readings.ring_rn_ohms),
                (Measurement::RingR2, readings.ring_r2_ohms),
                (
                    Measurement::InsulationResistance,
                    readings.insulation_resistance_mohm,
                ),
                (Measurement::EarthFaultLoopImpedance, readings.zs_ohms),
                (Measurement::MaximumZs, readings.max_zs_ohms),
                (Measurement::RcdTripTime, readings.rcd_trip_time_ms),
            ],
            TestData::MinorWorks(readings) => vec![
                (Measurement::R1PlusR2, readings.r1_plus_r2_ohms),
                (
                    Measurement::InsulationResistance,
                    readings.insulation_resistance_mohm,
                ),
                (Measurement::EarthFaultLoopImpedance, readings.zs_ohms),
                (Measurement::MaximumZs, readings.max_zs_ohms),
                (Measurement::RcdTripTime, readings.rcd_trip_time_ms),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircuitReadings {
    #[serde(default)]
    pub r1_plus_r2_ohms: Option<f32>,
    #[serde(default)]
    pub ring_r1_ohms: Option<f32>,
    #[serde(default)]
    pub ring_rn_ohms: Option<f32>,
    #[serde(default)]
    pub ring_r2_ohms: Option<f32>,
    #[serde(default)]
    pub insulation_resistance_mohm: Option<f32>,
    #[serde(default)]
    pub polarity_confirmed: Option<bool>,
    #[serde(default)]
    pub zs_ohms: Option<f32>,
    #[serde(default)]
    pub max_zs_ohms: Option<f32>,
    #[serde(default)]
    pub rcd_trip_time_ms: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinorWorksReadings {
    #[serde(default)]
    pub r1_plus_r2_ohms: Option<f32>,
    #[serde(default)]
    pub insulation_resistance_mohm: Option<f32>,
    #[serde(default)]
    pub polarity_confirmed: Option<bool>,
    #[serde(default)]
    pub zs_ohms: Option<f32>,
    #[serde(default)]
    pub max_zs_ohms: Option<f32>,
    #[serde(default)]
    pub rcd_trip_time_ms: Option<f32>,
}

/// Individual tests on a schedule of test results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    R1PlusR2,
    RingR1,
    RingRn,
    RingR2,
    RingContinuity,
    InsulationResistance,
    Polarity,
    EarthFaultLoopImpedance,
    MaximumZs,
    RcdTripTime,
}

impl Measurement {
    pub const fn label(self) -> &'static str {
        match self {
            Self::R1PlusR2 => "R1+R2",
            Self::RingR1 => "ring r1",
            Self::RingRn => "ring rn",
            Self::RingR2 => "ring r2",
            Self::RingContinuity => "ring continuity",
            Self::InsulationResistance => "insulation resistance",
            Self::Polarity => "polarity",
            Self::EarthFaultLoopImpedance => "Zs",
            Self::MaximumZs => "max Zs",
            Self::RcdTripTime => "RCD trip time",
        }
    }
}

/// Validated inputs for a single certificate evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateInputs {
    pub certificate_type: CertificateType,
    pub observations: Vec<Observation>,
    pub checklist: Vec<ChecklistAnswer>,
    pub test_results: Vec<TestResult>,
}

impl CertificateInputs {
    pub fn empty(certificate_type: CertificateType) -> Self {
        Self {
            certificate_type,
            observations: Vec::new(),
            checklist: Vec::new(),
            test_results: Vec::new(),
        }
    }
}
