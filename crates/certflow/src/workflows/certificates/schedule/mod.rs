mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use super::domain::{CertificateType, CircuitReadings, MinorWorksReadings, TestData, TestResult};
use parser::ScheduleRow;

#[derive(Debug)]
pub enum ScheduleImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidReading {
        row: usize,
        column: &'static str,
        value: String,
    },
    MissingCircuit {
        row: usize,
    },
    DuplicateCircuit(String),
}

impl std::fmt::Display for ScheduleImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleImportError::Io(err) => write!(f, "failed to read test schedule: {}", err),
            ScheduleImportError::Csv(err) => write!(f, "invalid test schedule CSV: {}", err),
            ScheduleImportError::InvalidReading { row, column, value } => write!(
                f,
                "row {}: '{}' is not a valid {} reading",
                row, value, column
            ),
            ScheduleImportError::MissingCircuit { row } => {
                write!(f, "row {}: circuit reference is blank", row)
            }
            ScheduleImportError::DuplicateCircuit(circuit) => {
                write!(f, "circuit {} appears more than once", circuit)
            }
        }
    }
}

impl std::error::Error for ScheduleImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleImportError::Io(err) => Some(err),
            ScheduleImportError::Csv(err) => Some(err),
            ScheduleImportError::InvalidReading { .. }
            | ScheduleImportError::MissingCircuit { .. }
            | ScheduleImportError::DuplicateCircuit(_) => None,
        }
    }
}

impl From<std::io::Error> for ScheduleImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ScheduleImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads a schedule of test results exported from a multifunction tester.
pub struct TestScheduleImporter;

impl TestScheduleImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        certificate_type: CertificateType,
    ) -> Result<Vec<TestResult>, ScheduleImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, certificate_type)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        certificate_type: CertificateType,
    ) -> Result<Vec<TestResult>, ScheduleImportError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        for (index, row) in parser::parse_rows(reader)?.into_iter().enumerate() {
            if row.circuit_ref.is_empty() {
                return Err(ScheduleImportError::MissingCircuit { row: index + 2 });
            }
            if !seen.insert(row.circuit_ref.clone()) {
                return Err(ScheduleImportError::DuplicateCircuit(row.circuit_ref));
            }
            results.push(test_result_for(certificate_type, row, index + 2)?);
        }

        Ok(results)
    }
}

fn test_result_for(
    certificate_type: CertificateType,
    row: ScheduleRow,
    line: usize,
) -> Result<TestResult, ScheduleImportError> {
    let data = match certificate_type {
        CertificateType::Eicr | CertificateType::Eic => TestData::Circuit(CircuitReadings {
            r1_plus_r2_ohms: row.r1_plus_r2_ohms,
            ring_r1_ohms: row.ring_r1_ohms,
            ring_rn_ohms: row.ring_rn_ohms,
            ring_r2_ohms: row.ring_r2_ohms,
            insulation_resistance_mohm: row.insulation_resistance_mohm,
            polarity_confirmed: row.polarity_confirmed,
            zs_ohms: row.zs_ohms,
            max_zs_ohms: row.max_zs_ohms,
            rcd_trip_time_ms: row.rcd_trip_time_ms,
        }),
        CertificateType::Mwc => {
            reject_ring_reading(line, "Ring r1", row.ring_r1_ohms)?;
            reject_ring_reading(line, "Ring rn", row.ring_rn_ohms)?;
            reject_ring_reading(line, "Ring r2", row.ring_r2_ohms)?;
            TestData::MinorWorks(MinorWorksReadings {
                r1_plus_r2_ohms: row.r1_plus_r2_ohms,
                insulation_resistance_mohm: row.insulation_resistance_mohm,
                polarity_confirmed: row.polarity_confirmed,
                zs_ohms: row.zs_ohms,
                max_zs_ohms: row.max_zs_ohms,
                rcd_trip_time_ms: row.rcd_trip_time_ms,
            })
        }
    };

    Ok(TestResult {
        circuit_ref: row.circuit_ref,
        data,
    })
}

/// Minor works schedules carry no ring continuity; a recorded value is a wrong export.
fn reject_ring_reading(
    line: usize,
    column: &'static str,
    value: Option<f32>,
) -> Result<(), ScheduleImportError> {
    match value {
        Some(value) => Err(ScheduleImportError::InvalidReading {
            row: line,
            column,
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}
