//! Object interaction detection: sustained proximity between two classes.
//!
//! Proximity evidence is accumulated per spatial bucket, keyed by the camera
//! location and the floored top-left corner of the primary detection. Counts
//! never decay; a bucket fires once its count reaches the detection threshold
//! and its cooldown has elapsed, then starts counting again from zero.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use super::{AlertEvent, AnomalyKind};
use crate::clock::{elapsed_since, Clock, SystemClock};
use crate::config::InteractionConfig;
use crate::matching::euclidean;
use crate::utils::capitalize;
use crate::{AnomalyLedger, Detection, Result};

/// Location used in bucket keys when none is given.
const UNKNOWN_KEY_LOCATION: &str = "unknown";

/// Location used in messages and records when none is given.
const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Spatial bucket identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub location: String,
    pub x: i64,
    pub y: i64,
}

impl BucketKey {
    /// Key for a primary detection seen at `location`.
    pub fn for_detection(location: Option<&str>, detection: &Detection) -> Self {
        Self {
            location: location.unwrap_or(UNKNOWN_KEY_LOCATION).to_string(),
            x: detection.bbox.x1.floor() as i64,
            y: detection.bbox.y1.floor() as i64,
        }
    }
}

/// Evidence accumulated for one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionBucket {
    pub consecutive_count: u32,
    pub last_alert_time: Option<f64>,
}

/// Interaction detector.
pub struct InteractionDetector<C: Clock = SystemClock> {
    config: InteractionConfig,
    clock: C,
    buckets: HashMap<BucketKey, InteractionBucket>,
    ledger: AnomalyLedger,
}

impl InteractionDetector<SystemClock> {
    /// Create a detector on the wall clock.
    pub fn new(config: InteractionConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> InteractionDetector<C> {
    /// Create a detector with an explicit time source.
    pub fn with_clock(config: InteractionConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            buckets: HashMap::new(),
            ledger: AnomalyLedger::new(),
        })
    }

    /// Feed one frame of detections.
    ///
    /// Every primary/secondary pair closer than the proximity distance adds
    /// one to the primary detection's bucket, so a bucket can grow by more
    /// than one per frame.
    ///
    /// # Returns
    /// The alerts fired by this frame
    pub fn update(
        &mut self,
        frame_detections: &[Detection],
        frame_id: u64,
        location: Option<&str>,
    ) -> Vec<AlertEvent> {
        let primaries: Vec<&Detection> = frame_detections
            .iter()
            .filter(|d| d.is_class(&self.config.primary_class))
            .collect();
        let secondaries: Vec<&Detection> = frame_detections
            .iter()
            .filter(|d| d.is_class(&self.config.secondary_class))
            .collect();

        let mut alerts = Vec::new();
        for primary in &primaries {
            for secondary in &secondaries {
                let distance = euclidean(&primary.center(), &secondary.center());
                if distance >= self.config.proximity_distance {
                    continue;
                }

                let key = BucketKey::for_detection(location, primary);
                let bucket = self.buckets.entry(key.clone()).or_default();
                bucket.consecutive_count += 1;
                debug!(
                    frame_id,
                    location = %key.location,
                    x = key.x,
                    y = key.y,
                    count = bucket.consecutive_count,
                    "proximity event"
                );

                if bucket.consecutive_count >= self.config.detection_threshold
                    && self.cooldown_elapsed(&key)
                {
                    alerts.push(self.trigger_alert(&key, primary, secondary, location));
                }
            }
        }

        alerts
    }

    /// Clear every bucket and cooldown stamp.
    pub fn reset(&mut self) {
        self.buckets.clear();
    }

    pub fn bucket(&self, key: &BucketKey) -> Option<&InteractionBucket> {
        self.buckets.get(key)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &AnomalyLedger {
        &self.ledger
    }

    fn cooldown_elapsed(&self, key: &BucketKey) -> bool {
        match self.buckets.get(key).and_then(|b| b.last_alert_time) {
            None => true,
            Some(last) => elapsed_since(last, self.clock.now()) > self.config.alert_cooldown,
        }
    }

    fn trigger_alert(
        &mut self,
        key: &BucketKey,
        primary: &Detection,
        secondary: &Detection,
        location: Option<&str>,
    ) -> AlertEvent {
        let now = self.clock.now();
        let location_str = location.unwrap_or(UNKNOWN_LOCATION);
        let primary_name = capitalize(&self.config.primary_class);
        let primary_label = confidence_label(&self.config.primary_class);
        let secondary_label = confidence_label(&self.config.secondary_class);

        let message = format!(
            "ALERT: {} with {} detected at {}\nTime: {}\n{} confidence: {:.2}\n{} confidence: {:.2}",
            primary_name,
            self.config.secondary_class,
            location_str,
            format_local_time(now),
            primary_label,
            primary.confidence,
            secondary_label,
            secondary.confidence
        );

        let subject_id = format!(
            "{}_{}_{}_{}",
            self.config.primary_class.replace(' ', "_"),
            key.location,
            key.x,
            key.y
        );
        info!(subject = %subject_id, location = location_str, "object interaction detected");

        self.ledger.record(
            subject_id.clone(),
            now,
            0.0,
            Some(&self.config.anomaly_type),
            Some(location_str),
        );

        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.consecutive_count = 0;
            bucket.last_alert_time = Some(now);
        }

        AlertEvent {
            message,
            kind: AnomalyKind::Interaction,
            subject_id,
            timestamp: now,
        }
    }
}

// Last word of a class label, capitalized: "cell phone" -> "Phone"
fn confidence_label(class: &str) -> String {
    capitalize(class.rsplit(' ').next().unwrap_or(class))
}

// Format clock seconds as local "%Y-%m-%d %H:%M:%S"
fn format_local_time(timestamp: f64) -> String {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(Local::now)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
