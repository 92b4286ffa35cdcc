use serde::{Deserialize, Serialize};

use super::rules::RuleSet;
use super::OutcomeFinding;

/// Verdict recorded on a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Satisfactory,
    Unsatisfactory,
    Pass,
    Fail,
    Incomplete,
}

impl Outcome {
    pub const fn label(self) -> &'static str {
        match self {
            Outcome::Satisfactory => "satisfactory",
            Outcome::Unsatisfactory => "unsatisfactory",
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Incomplete => "incomplete",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Outcome::Satisfactory => "Satisfactory",
            Outcome::Unsatisfactory => "Unsatisfactory",
            Outcome::Pass => "Pass",
            Outcome::Fail => "Fail",
            Outcome::Incomplete => "Incomplete",
        }
    }

    pub const fn is_failing(self) -> bool {
        matches!(self, Outcome::Unsatisfactory | Outcome::Fail)
    }
}

/// How a single finding bears on the verdict, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingEffect {
    Advisory,
    Caveat,
    Incomplete,
    Failing,
}

/// Machine-readable code naming the rule that fired, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    AllClear,
    ImprovementRecommended,
    FurtherInvestigation,
    LimitationRecorded,
    CheckNotVerified,
    ReadingMissing,
    TestOutOfTolerance,
    RequiredCheckFailed,
    C2Present,
    C1Present,
}

impl OutcomeReason {
    pub const fn code(self) -> &'static str {
        match self {
            OutcomeReason::AllClear => "all_clear",
            OutcomeReason::ImprovementRecommended => "improvement_recommended",
            OutcomeReason::FurtherInvestigation => "further_investigation",
            OutcomeReason::LimitationRecorded => "limitation_recorded",
            OutcomeReason::CheckNotVerified => "check_not_verified",
            OutcomeReason::ReadingMissing => "reading_missing",
            OutcomeReason::TestOutOfTolerance => "test_out_of_tolerance",
            OutcomeReason::RequiredCheckFailed => "required_check_failed",
            OutcomeReason::C2Present => "c2_present",
            OutcomeReason::C1Present => "c1_present",
        }
    }

    pub const fn summary(self) -> &'static str {
        match self {
            OutcomeReason::AllClear => "no outstanding issues",
            OutcomeReason::ImprovementRecommended => "improvement recommended (C3)",
            OutcomeReason::FurtherInvestigation => "further investigation required (FI)",
            OutcomeReason::LimitationRecorded => "limitation recorded",
            OutcomeReason::CheckNotVerified => "inspection item not verified",
            OutcomeReason::ReadingMissing => "required test reading missing",
            OutcomeReason::TestOutOfTolerance => "test reading out of tolerance",
            OutcomeReason::RequiredCheckFailed => "compliance check answered no",
            OutcomeReason::C2Present => "potentially dangerous condition (C2)",
            OutcomeReason::C1Present => "danger present (C1)",
        }
    }
}

pub(crate) struct Verdict {
    pub outcome: Outcome,
    pub reason: OutcomeReason,
    pub caveat: bool,
}

/// Most severe finding wins; the reason comes from the highest (effect, reason) pair.
pub(crate) fn decide_outcome(rules: &RuleSet, findings: &[OutcomeFinding]) -> Verdict {
    let caveat = findings
        .iter()
        .any(|finding| finding.effect == FindingEffect::Caveat);

    let Some(worst) = findings
        .iter()
        .max_by_key(|finding| (finding.effect, finding.reason))
    else {
        return Verdict {
            outcome: rules.clean,
            reason: OutcomeReason::AllClear,
            caveat,
        };
    };

    let outcome = match worst.effect {
        FindingEffect::Failing => rules.failing,
        FindingEffect::Incomplete => Outcome::Incomplete,
        FindingEffect::Caveat | FindingEffect::Advisory => rules.clean,
    };

    Verdict {
        outcome,
        reason: worst.reason,
        caveat,
    }
}
