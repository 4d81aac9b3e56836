//! # Vigil - Tracking and Temporal Anomaly Detection
//!
//! Turns a stream of per-frame object detections into stable track identities
//! and temporally-extended anomaly alerts.
//!
//! ## Features
//!
//! - Greedy nearest-centroid association with track aging and eviction
//! - Loitering (dwell-time) detection for restricted zones
//! - Object interaction (sustained proximity) detection with cooldowns
//! - Append-only anomaly ledger with per-subject aggregates and CSV reports
//! - Per-camera [`Monitor`] tying the pieces together for one processing tick
//!
//! ## Example
//!
//! ```rust,ignore
//! use vigil_rs::{Detection, Tracker, TrackerConfig};
//! use vigil_rs::detection::BoundingBox;
//!
//! let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
//!
//! let bbox = BoundingBox::new(100.0, 100.0, 150.0, 200.0).unwrap();
//! let detections = vec![Detection::new("person", 0.9, bbox).unwrap()];
//! tracker.update(&detections);
//!
//! for (id, center) in tracker.get_tracks() {
//!     println!("track {} at ({:.1}, {:.1})", id, center.x, center.y);
//! }
//! ```

// Public modules
pub mod anomaly;
pub mod clock;
pub mod config;
pub mod detection;
pub mod ledger;
pub mod matching;
pub mod monitor;
pub mod report;
pub mod track;
pub mod tracker;
pub mod utils;

// Re-exports for convenience
pub use anomaly::{AlertEvent, AlertSink, AnomalyKind, InteractionDetector, LoiteringDetector};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MonitorConfig, ZoneConfig, ZoneTable};
pub use detection::{BoundingBox, Detection, RawDetection};
pub use ledger::{AnomalyLedger, AnomalyRecord, LedgerSummary};
pub use monitor::{FixedZone, Monitor, RegionZones, ZoneResolver};
pub use track::Track;
pub use tracker::{MinHitsPolicy, Tracker, TrackerConfig};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the vigil library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid detection: {0}")]
        InvalidDetection(String),

        #[error("Invalid bounding box: expected x1 < x2 and y1 < y2, got ({x1}, {y1}, {x2}, {y2})")]
        InvalidBoundingBox { x1: f64, y1: f64, x2: f64, y2: f64 },

        #[error("Configuration parse error: {0}")]
        ConfigParse(#[from] serde_yaml::Error),

        #[error("CSV error: {0}")]
        Csv(#[from] csv::Error),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),
    }

    /// Result type for vigil operations
    pub type Result<T> = std::result::Result<T, Error>;
}
