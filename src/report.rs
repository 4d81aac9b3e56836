//! CSV export of the anomaly ledger.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::{AnomalyLedger, AnomalyRecord, Error, Result};

const BASIC_HEADER: [&str; 3] = ["person_id", "timestamp", "duration"];
const EXTENDED_HEADER: [&str; 5] = ["person_id", "timestamp", "duration", "anomaly_type", "location"];

#[derive(Serialize)]
struct BasicRow<'a> {
    person_id: &'a str,
    timestamp: f64,
    duration: f64,
}

#[derive(Serialize)]
struct ExtendedRow<'a> {
    person_id: &'a str,
    timestamp: f64,
    duration: f64,
    anomaly_type: Option<&'a str>,
    location: Option<&'a str>,
}

impl<'a> From<&'a AnomalyRecord> for BasicRow<'a> {
    fn from(record: &'a AnomalyRecord) -> Self {
        Self {
            person_id: &record.subject_id,
            timestamp: record.timestamp,
            duration: record.duration,
        }
    }
}

impl<'a> From<&'a AnomalyRecord> for ExtendedRow<'a> {
    fn from(record: &'a AnomalyRecord) -> Self {
        Self {
            person_id: &record.subject_id,
            timestamp: record.timestamp,
            duration: record.duration,
            anomaly_type: record.anomaly_type.as_deref(),
            location: record.location.as_deref(),
        }
    }
}

/// Writer for anomaly reports.
///
/// The output is CSV with columns `person_id,timestamp,duration`, extended by
/// `anomaly_type,location` when any record carries either field. The header
/// is written even for an empty ledger.
pub struct AnomalyReport;

impl AnomalyReport {
    /// Write the ledger as CSV to `writer`.
    pub fn write_csv<W: Write>(ledger: &AnomalyLedger, writer: W) -> Result<()> {
        let extended = ledger
            .records()
            .iter()
            .any(|r| r.anomaly_type.is_some() || r.location.is_some());

        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        if extended {
            wtr.write_record(EXTENDED_HEADER)?;
            for record in ledger.records() {
                wtr.serialize(ExtendedRow::from(record))?;
            }
        } else {
            wtr.write_record(BASIC_HEADER)?;
            for record in ledger.records() {
                wtr.serialize(BasicRow::from(record))?;
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// Export the ledger to a CSV file, creating parent directories as needed.
    pub fn export_csv<P: AsRef<Path>>(ledger: &AnomalyLedger, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(std::io::Error::new(
                    e.kind(),
                    format!("failed to create report folder: {}", e),
                ))
            })?;
        }

        let file = File::create(path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to create report file '{}': {}", path.display(), e),
            ))
        })?;

        Self::write_csv(ledger, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(ledger: &AnomalyLedger) -> String {
        let mut out = Vec::new();
        AnomalyReport::write_csv(ledger, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_basic_columns() {
        let mut ledger = AnomalyLedger::new();
        ledger.record("7", 100.5, 11.0, None, None);

        let csv = to_string(&ledger);

        assert_eq!(csv, "person_id,timestamp,duration\n7,100.5,11.0\n");
    }

    #[test]
    fn test_extended_columns() {
        let mut ledger = AnomalyLedger::new();
        ledger.record("7", 1.0, 11.0, None, None);
        ledger.record("person_cam_0_0", 2.0, 0.0, Some("person_with_phone"), Some("Lobby, east"));

        let csv = to_string(&ledger);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "person_id,timestamp,duration,anomaly_type,location");
        assert_eq!(lines[1], "7,1.0,11.0,,");
        assert_eq!(lines[2], "person_cam_0_0,2.0,0.0,person_with_phone,\"Lobby, east\"");
    }

    #[test]
    fn test_empty_ledger_header_only() {
        assert_eq!(to_string(&AnomalyLedger::new()), "person_id,timestamp,duration\n");
    }

    #[test]
    fn test_export_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("anomalies_report.csv");

        let mut ledger = AnomalyLedger::new();
        ledger.record("3", 5.0, 12.0, None, None);
        AnomalyReport::export_csv(&ledger, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("person_id,timestamp,duration\n"));
        assert!(contents.contains("3,5.0,12.0"));
    }

    #[test]
    fn test_text_fields_quoted() {
        let mut ledger = AnomalyLedger::new();
        ledger.record("a\nb", 1.0, 2.0, Some("x"), Some("L"));
        ledger.record("say \"hi\"", 3.0, 4.0, Some("x"), Some("L"));

        let csv = to_string(&ledger);

        assert_eq!(
            csv,
            "person_id,timestamp,duration,anomaly_type,location\n\
             \"a\nb\",1.0,2.0,x,L\n\
             \"say \"\"hi\"\"\",3.0,4.0,x,L\n"
        );
    }
}
