//! Append-only ledger of fired anomalies.

use std::collections::HashMap;

use serde::Serialize;

/// One fired anomaly. Never modified after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyRecord {
    /// Subject the anomaly is attributed to (track ID or synthesized key).
    pub subject_id: String,

    /// When the anomaly fired, in clock seconds.
    pub timestamp: f64,

    /// How long the anomalous condition had lasted, in seconds.
    pub duration: f64,

    /// Anomaly category, e.g. "loitering" or "person_with_phone".
    pub anomaly_type: Option<String>,

    /// Zone or camera location where it fired.
    pub location: Option<String>,
}

/// Aggregate view over the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_anomalies: usize,
    pub average_duration: f64,
    pub per_subject_count: HashMap<String, usize>,
    pub per_subject_total_duration: HashMap<String, f64>,
}

/// Append-only anomaly log with incrementally maintained per-subject aggregates.
///
/// The ledger performs no I/O; see [`crate::report`] for export.
#[derive(Debug, Clone, Default)]
pub struct AnomalyLedger {
    records: Vec<AnomalyRecord>,
    count_by_subject: HashMap<String, usize>,
    duration_by_subject: HashMap<String, f64>,
    total_duration: f64,
}

impl AnomalyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record built from its parts.
    pub fn record(
        &mut self,
        subject_id: impl Into<String>,
        timestamp: f64,
        duration: f64,
        anomaly_type: Option<&str>,
        location: Option<&str>,
    ) {
        self.push(AnomalyRecord {
            subject_id: subject_id.into(),
            timestamp,
            duration,
            anomaly_type: anomaly_type.map(str::to_string),
            location: location.map(str::to_string),
        });
    }

    /// Append a record and update the aggregates.
    pub fn push(&mut self, record: AnomalyRecord) {
        *self
            .count_by_subject
            .entry(record.subject_id.clone())
            .or_insert(0) += 1;
        *self
            .duration_by_subject
            .entry(record.subject_id.clone())
            .or_insert(0.0) += record.duration;
        self.total_duration += record.duration;
        self.records.push(record);
    }

    /// Append every record of `other`, keeping its order.
    pub fn extend_from(&mut self, other: &AnomalyLedger) {
        for record in &other.records {
            self.push(record.clone());
        }
    }

    /// Combine several ledgers into one ordered by timestamp.
    pub fn merged<'a, I>(ledgers: I) -> Self
    where
        I: IntoIterator<Item = &'a AnomalyLedger>,
    {
        let mut records: Vec<&AnomalyRecord> = ledgers
            .into_iter()
            .flat_map(|ledger| ledger.records.iter())
            .collect();
        // Stable sort keeps per-ledger order for equal timestamps
        records.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let mut merged = Self::new();
        for record in records {
            merged.push(record.clone());
        }
        merged
    }

    pub fn records(&self) -> &[AnomalyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records attributed to `subject_id`.
    pub fn count_for(&self, subject_id: &str) -> usize {
        self.count_by_subject.get(subject_id).copied().unwrap_or(0)
    }

    /// Total recorded duration for `subject_id`.
    pub fn total_duration_for(&self, subject_id: &str) -> f64 {
        self.duration_by_subject.get(subject_id).copied().unwrap_or(0.0)
    }

    /// Compute the aggregate summary.
    ///
    /// `average_duration` is 0 when the ledger is empty.
    pub fn summarize(&self) -> LedgerSummary {
        let total_anomalies = self.records.len();
        let average_duration = if total_anomalies > 0 {
            self.total_duration / total_anomalies as f64
        } else {
            0.0
        };

        LedgerSummary {
            total_anomalies,
            average_duration,
            per_subject_count: self.count_by_subject.clone(),
            per_subject_total_duration: self.duration_by_subject.clone(),
        }
    }

    /// Mean duration per subject.
    pub fn average_duration_per_subject(&self) -> HashMap<String, f64> {
        self.duration_by_subject
            .iter()
            .filter_map(|(subject, total)| {
                let count = self.count_for(subject);
                (count > 0).then(|| (subject.clone(), total / count as f64))
            })
            .collect()
    }
}
