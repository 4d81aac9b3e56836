//! Configuration surface consumed by the tracker and the anomaly detectors.
//!
//! Every component takes its configuration explicitly in its constructor.
//! [`MonitorConfig`] gathers them all and can be loaded from YAML:
//!
//! ```yaml
//! zones:
//!   flag_room:
//!     is_restricted: true
//!     time_threshold: 10
//! interaction:
//!   detection_threshold: 3
//!   alert_cooldown: 30
//!   proximity_distance: 100
//! tracker:
//!   distance_threshold: 50
//!   max_age: 30
//!   min_hits: 3
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, TrackerConfig};

/// Settings for one named zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Whether dwelling in the zone is watched at all.
    pub is_restricted: bool,

    /// Seconds a subject may stay before loitering is flagged.
    pub time_threshold: f64,
}

impl ZoneConfig {
    pub fn restricted(time_threshold: f64) -> Self {
        Self {
            is_restricted: true,
            time_threshold,
        }
    }
}

/// Zone name to zone settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneTable {
    zones: HashMap<String, ZoneConfig>,
}

impl ZoneTable {
    /// An empty table: every zone is unrestricted.
    pub fn empty() -> Self {
        Self {
            zones: HashMap::new(),
        }
    }

    pub fn with_zone(mut self, name: impl Into<String>, zone: ZoneConfig) -> Self {
        self.insert(name, zone);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, zone: ZoneConfig) {
        self.zones.insert(name.into(), zone);
    }

    pub fn get(&self, name: &str) -> Option<&ZoneConfig> {
        self.zones.get(name)
    }

    /// The zone's settings if it is configured and restricted.
    pub fn restricted(&self, name: &str) -> Option<&ZoneConfig> {
        self.get(name).filter(|zone| zone.is_restricted)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, zone) in &self.zones {
            if !zone.time_threshold.is_finite() || zone.time_threshold < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "zone '{}' has invalid time_threshold {}",
                    name, zone.time_threshold
                )));
            }
        }
        Ok(())
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::empty().with_zone("flag_room", ZoneConfig::restricted(10.0))
    }
}

/// Settings for the object interaction (proximity) detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Label of the subject class (e.g. "person").
    pub primary_class: String,

    /// Label of the object class (e.g. "cell phone").
    pub secondary_class: String,

    /// Proximity events needed before an alert fires.
    pub detection_threshold: u32,

    /// Seconds that must pass between two alerts of the same bucket.
    pub alert_cooldown: f64,

    /// Center distance (exclusive) below which two detections are close.
    pub proximity_distance: f64,

    /// Anomaly type written to the ledger.
    pub anomaly_type: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            primary_class: "person".to_string(),
            secondary_class: "cell phone".to_string(),
            detection_threshold: 3,
            alert_cooldown: 30.0,
            proximity_distance: 100.0,
            anomaly_type: "person_with_phone".to_string(),
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.detection_threshold == 0 {
            return Err(Error::InvalidConfig(
                "detection_threshold must be at least 1".to_string(),
            ));
        }
        if !self.alert_cooldown.is_finite() || self.alert_cooldown < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "alert_cooldown must be non-negative, got {}",
                self.alert_cooldown
            )));
        }
        if !self.proximity_distance.is_finite() || self.proximity_distance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "proximity_distance must be positive, got {}",
                self.proximity_distance
            )));
        }
        if self.primary_class.is_empty() || self.secondary_class.is_empty() {
            return Err(Error::InvalidConfig("class labels must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Per-class head-count alert thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCountConfig {
    /// Alert when a frame holds more than this many detections of the class.
    pub thresholds: HashMap<String, usize>,
}

impl Default for ClassCountConfig {
    fn default() -> Self {
        let thresholds = [("person", 1), ("car", 2), ("truck", 1)]
            .into_iter()
            .map(|(class, limit)| (class.to_string(), limit))
            .collect();
        Self { thresholds }
    }
}

/// Complete configuration of one camera's [`Monitor`](crate::Monitor).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub zones: ZoneTable,
    pub interaction: InteractionConfig,
    pub tracker: TrackerConfig,
    pub class_counts: ClassCountConfig,
}

impl MonitorConfig {
    /// Load a configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to read config '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: MonitorConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.zones.validate()?;
        self.interaction.validate()?;
        self.tracker.validate()
    }
}
