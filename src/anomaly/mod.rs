//! Temporal anomaly detectors.
//!
//! This module provides:
//! - `LoiteringDetector` - dwell-time state machine for restricted zones
//! - `InteractionDetector` - sustained proximity between two object classes
//! - `ClassCountMonitor` - per-frame head-count thresholds
//! - Alert events and the `AlertSink` seam for notification collaborators

mod alert;
mod class_count;
mod interaction;
mod loitering;

pub use alert::{AlertCategory, AlertEvent, AlertSink, AnomalyKind, CollectingSink, LogSink};
pub use class_count::ClassCountMonitor;
pub use interaction::{BucketKey, InteractionBucket, InteractionDetector};
pub use loitering::{LoiteringDetector, ZonePresence};
