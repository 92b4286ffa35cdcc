use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::ScheduleImportError;

/// One row of an instrument schedule export, readings already parsed.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ScheduleRow {
    pub(crate) circuit_ref: String,
    pub(crate) r1_plus_r2_ohms: Option<f32>,
    pub(crate) ring_r1_ohms: Option<f32>,
    pub(crate) ring_rn_ohms: Option<f32>,
    pub(crate) ring_r2_ohms: Option<f32>,
    pub(crate) insulation_resistance_mohm: Option<f32>,
    pub(crate) polarity_confirmed: Option<bool>,
    pub(crate) zs_ohms: Option<f32>,
    pub(crate) max_zs_ohms: Option<f32>,
    pub(crate) rcd_trip_time_ms: Option<f32>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ScheduleRow>, ScheduleImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawScheduleRow>().enumerate() {
        let raw = record?;
        // header is line 1
        let line = index + 2;
        let reading = |column: &'static str, value: &Option<String>| {
            parse_reading(value.as_deref()).map_err(|value| ScheduleImportError::InvalidReading {
                row: line,
                column,
                value,
            })
        };

        rows.push(ScheduleRow {
            circuit_ref: raw.circuit.trim().to_string(),
            r1_plus_r2_ohms: reading("R1+R2", &raw.r1_plus_r2)?,
            ring_r1_ohms: reading("Ring r1", &raw.ring_r1)?,
            ring_rn_ohms: reading("Ring rn", &raw.ring_rn)?,
            ring_r2_ohms: reading("Ring r2", &raw.ring_r2)?,
            insulation_resistance_mohm: reading("IR", &raw.insulation_resistance)?,
            polarity_confirmed: parse_polarity(raw.polarity.as_deref()).map_err(|value| {
                ScheduleImportError::InvalidReading {
                    row: line,
                    column: "Polarity",
                    value,
                }
            })?,
            zs_ohms: reading("Zs", &raw.zs)?,
            max_zs_ohms: reading("Max Zs", &raw.max_zs)?,
            rcd_trip_time_ms: reading("RCD", &raw.rcd)?,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawScheduleRow {
    #[serde(rename = "Circuit")]
    circuit: String,
    #[serde(rename = "R1+R2", default, deserialize_with = "empty_string_as_none")]
    r1_plus_r2: Option<String>,
    #[serde(rename = "Ring r1", default, deserialize_with = "empty_string_as_none")]
    ring_r1: Option<String>,
    #[serde(rename = "Ring rn", default, deserialize_with = "empty_string_as_none")]
    ring_rn: Option<String>,
    #[serde(rename = "Ring r2", default, deserialize_with = "empty_string_as_none")]
    ring_r2: Option<String>,
    #[serde(rename = "IR", default, deserialize_with = "empty_string_as_none")]
    insulation_resistance: Option<String>,
    #[serde(rename = "Polarity", default, deserialize_with = "empty_string_as_none")]
    polarity: Option<String>,
    #[serde(rename = "Zs", default, deserialize_with = "empty_string_as_none")]
    zs: Option<String>,
    #[serde(rename = "Max Zs", default, deserialize_with = "empty_string_as_none")]
    max_zs: Option<String>,
    #[serde(rename = "RCD", default, deserialize_with = "empty_string_as_none")]
    rcd: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn is_unrecorded(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "n/a" | "na" | "lim" | "n/v" | "nv" | "-"
    )
}

/// Over-range readings such as `>299` are taken at the instrument bound.
fn parse_reading(value: Option<&str>) -> Result<Option<f32>, String> {
    let Some(value) = value.map(str::trim) else {
        return Ok(None);
    };
    if is_unrecorded(value) {
        return Ok(None);
    }

    let numeric = value.trim_start_matches(['>', '<']).trim();
    match numeric.parse::<f32>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(Some(parsed)),
        _ => Err(value.to_string()),
    }
}

fn parse_polarity(value: Option<&str>) -> Result<Option<bool>, String> {
    let Some(value) = value.map(str::trim) else {
        return Ok(None);
    };
    if is_unrecorded(value) {
        return Ok(None);
    }

    match value.to_ascii_lowercase().as_str() {
        "✓" | "yes" | "y" | "ok" | "pass" | "true" => Ok(Some(true)),
        "✗" | "x" | "no" | "n" | "fail" | "false" => Ok(Some(false)),
        _ => Err(value.to_string()),
    }
}

#[cfg(test)]
pub(crate) fn parse_reading_for_tests(value: &str) -> Result<Option<f32>, String> {
    parse_reading(Some(value))
}
