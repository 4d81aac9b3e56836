//! Per-frame head-count alerts.

use std::collections::BTreeMap;

use super::{AlertEvent, AnomalyKind};
use crate::config::ClassCountConfig;
use crate::Detection;

/// Alerts when a frame holds more detections of a class than allowed.
///
/// Stateless across frames; nothing is written to the ledger.
#[derive(Debug, Clone, Default)]
pub struct ClassCountMonitor {
    config: ClassCountConfig,
}

impl ClassCountMonitor {
    pub fn new(config: ClassCountConfig) -> Self {
        Self { config }
    }

    /// Count detections per class in one frame.
    pub fn count(detections: &[Detection]) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for detection in detections {
            *counts.entry(detection.label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Check one frame, returning an alert per class over its threshold.
    ///
    /// Alerts are ordered by class label.
    pub fn check(&self, detections: &[Detection], timestamp: f64) -> Vec<AlertEvent> {
        Self::count(detections)
            .into_iter()
            .filter_map(|(class, count)| {
                let limit = *self.config.thresholds.get(class)?;
                (count > limit).then(|| AlertEvent {
                    message: format!("Alert: Detected {} {}(s) in camera view", count, class),
                    kind: AnomalyKind::ClassCount,
                    subject_id: class.to_string(),
                    timestamp,
                })
            })
            .collect()
    }
}
