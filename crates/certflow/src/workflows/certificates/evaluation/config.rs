use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_INSULATION_RESISTANCE_MOHM: f32 = 1.0;
pub const DEFAULT_MAX_RCD_TRIP_TIME_MS: f32 = 300.0;
pub const DEFAULT_ZS_LIMIT_FACTOR: f32 = 0.8;
pub const DEFAULT_RING_TOLERANCE_OHMS: f32 = 0.05;
pub const DEFAULT_EXPLANATION_MAX_CHARS: usize = 320;
/// Shortest configurable display length; every headline fits with room for a citation.
pub const MIN_EXPLANATION_MAX_CHARS: usize = 80;

/// Thresholds applied when judging test readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub minimum_insulation_resistance_mohm: f32,
    pub maximum_rcd_trip_time_ms: f32,
    /// Share of the tabulated maximum Zs a measured reading may reach (conductor
    /// temperature correction).
    pub zs_limit_factor: f32,
    /// Largest accepted difference between ring end-to-end r1 and rn.
    pub ring_end_to_end_tolerance_ohms: f32,
    pub explanation_max_chars: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            minimum_insulation_resistance_mohm: DEFAULT_MIN_INSULATION_RESISTANCE_MOHM,
            maximum_rcd_trip_time_ms: DEFAULT_MAX_RCD_TRIP_TIME_MS,
            zs_limit_factor: DEFAULT_ZS_LIMIT_FACTOR,
            ring_end_to_end_tolerance_ohms: DEFAULT_RING_TOLERANCE_OHMS,
            explanation_max_chars: DEFAULT_EXPLANATION_MAX_CHARS,
        }
    }
}

impl EvaluationConfig {
    /// Highest measured Zs accepted for a circuit with the given tabulated maximum.
    pub fn zs_limit_for(&self, max_zs_ohms: f32) -> f32 {
        max_zs_ohms * self.zs_limit_factor
    }
}
