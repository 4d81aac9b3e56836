//! Per-camera processing pipeline.
//!
//! A [`Monitor`] owns one camera's tracker, anomaly detectors and alert sink,
//! and runs them in sequence for each frame:
//!
//! 1. validate the raw detections (malformed ones are skipped)
//! 2. update the tracker
//! 3. feed reported subject tracks matched this frame to the loitering
//!    detector, using the track ID as subject and the [`ZoneResolver`] to
//!    name the zone
//! 4. feed the whole frame to the interaction detector and head-count check
//! 5. hand every alert to the [`AlertSink`]
//!
//! Monitors share nothing, so one per camera can run on its own thread as long
//! as each is only driven from that thread.

use nalgebra::Point2;
use tracing::debug;

use crate::anomaly::{AlertSink, ClassCountMonitor, LogSink};
use crate::clock::{Clock, SystemClock};
use crate::detection::parse_frame;
use crate::{
    AlertEvent, AnomalyLedger, BoundingBox, Detection, InteractionDetector, LedgerSummary,
    LoiteringDetector, MonitorConfig, RawDetection, Result, Tracker,
};

/// Maps a subject position to the name of the zone it is in.
pub trait ZoneResolver {
    fn zone_at(&self, point: &Point2<f64>) -> Option<&str>;
}

/// Every position maps to the same zone (a camera watching a single room).
#[derive(Debug, Clone, Default)]
pub struct FixedZone {
    name: Option<String>,
}

impl FixedZone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// No position is in any zone.
    pub fn none() -> Self {
        Self { name: None }
    }
}

impl ZoneResolver for FixedZone {
    fn zone_at(&self, _point: &Point2<f64>) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Named rectangular regions of the image; the first region containing the
/// point wins.
#[derive(Debug, Clone, Default)]
pub struct RegionZones {
    regions: Vec<(String, BoundingBox)>,
}

impl RegionZones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, name: impl Into<String>, region: BoundingBox) -> Self {
        self.regions.push((name.into(), region));
        self
    }
}

impl ZoneResolver for RegionZones {
    fn zone_at(&self, point: &Point2<f64>) -> Option<&str> {
        self.regions
            .iter()
            .find(|(_, region)| region.contains(point))
            .map(|(name, _)| name.as_str())
    }
}

/// One camera's tracking and anomaly pipeline.
///
/// Alerts go to the sink `S`, which stays owned by the monitor and can be read
/// back through [`sink`](Self::sink).
pub struct Monitor<C: Clock + Clone = SystemClock, S: AlertSink = LogSink> {
    tracker: Tracker,
    loitering: LoiteringDetector<C>,
    interaction: InteractionDetector<C>,
    class_counts: ClassCountMonitor,
    zones: Box<dyn ZoneResolver>,
    sink: S,
    clock: C,
    subject_class: String,
    frame_id: u64,
}

impl Monitor<SystemClock> {
    /// Create a monitor on the wall clock, logging alerts through `tracing`.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> Monitor<C, LogSink> {
    /// Create a monitor with an explicit time source.
    ///
    /// No zone resolver is set, so loitering is not evaluated until
    /// [`with_zone_resolver`](Self::with_zone_resolver) is called.
    pub fn with_clock(config: MonitorConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let subject_class = config.interaction.primary_class.clone();

        Ok(Self {
            tracker: Tracker::new(config.tracker)?,
            loitering: LoiteringDetector::with_clock(config.zones, clock.clone()),
            interaction: InteractionDetector::with_clock(config.interaction, clock.clone())?,
            class_counts: ClassCountMonitor::new(config.class_counts),
            zones: Box::new(FixedZone::none()),
            sink: LogSink,
            clock,
            subject_class,
            frame_id: 0,
        })
    }
}

impl<C: Clock + Clone, S: AlertSink> Monitor<C, S> {
    pub fn with_zone_resolver(mut self, zones: impl ZoneResolver + 'static) -> Self {
        self.zones = Box::new(zones);
        self
    }

    /// Replace the alert sink.
    pub fn with_sink<T: AlertSink>(self, sink: T) -> Monitor<C, T> {
        Monitor {
            tracker: self.tracker,
            loitering: self.loitering,
            interaction: self.interaction,
            class_counts: self.class_counts,
            zones: self.zones,
            sink,
            clock: self.clock,
            subject_class: self.subject_class,
            frame_id: self.frame_id,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Process one frame of untyped detector output.
    pub fn process_frame(&mut self, raw: Vec<RawDetection>, location: Option<&str>) -> Vec<AlertEvent> {
        let detections = parse_frame(raw);
        self.process_detections(&detections, location)
    }

    /// Process one frame of validated detections.
    ///
    /// # Returns
    /// Every alert fired by this frame, in the order they were dispatched
    pub fn process_detections(&mut self, detections: &[Detection], location: Option<&str>) -> Vec<AlertEvent> {
        self.frame_id += 1;
        let mut alerts = Vec::new();

        // Only tracks reported by the tracker (confirmed under its min-hits policy)
        let subjects: Vec<(String, Point2<f64>)> = self
            .tracker
            .update(detections)
            .into_iter()
            .filter(|track| track.is_matched() && track.label == self.subject_class)
            .map(|track| (track.id.to_string(), track.center))
            .collect();

        for (subject_id, center) in subjects {
            match self.zones.zone_at(&center) {
                Some(zone) => alerts.extend(self.loitering.update(&subject_id, zone)),
                None => self.loitering.exit(&subject_id),
            }
        }

        for id in self.tracker.last_evicted() {
            self.loitering.exit(&id.to_string());
        }

        alerts.extend(self.interaction.update(detections, self.frame_id, location));
        alerts.extend(self.class_counts.check(detections, self.clock.now()));

        debug!(
            frame_id = self.frame_id,
            detections = detections.len(),
            tracks = self.tracker.current_track_count(),
            alerts = alerts.len(),
            "processed frame"
        );

        for alert in &alerts {
            self.sink.alert(alert);
        }
        alerts
    }

    /// Every anomaly recorded so far by this camera, ordered by time.
    pub fn ledger(&self) -> AnomalyLedger {
        AnomalyLedger::merged([self.loitering.ledger(), self.interaction.ledger()])
    }

    pub fn summarize(&self) -> LedgerSummary {
        self.ledger().summarize()
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn loitering(&self) -> &LoiteringDetector<C> {
        &self.loitering
    }

    pub fn interaction(&self) -> &InteractionDetector<C> {
        &self.interaction
    }

    /// Clear proximity evidence and cooldowns.
    pub fn reset_interactions(&mut self) {
        self.interaction.reset();
    }

    /// Frames processed so far.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }
}
