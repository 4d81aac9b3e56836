//! Main tracker implementation.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::first_match;
use crate::track::TrackIdFactory;
use crate::{Detection, Error, Result, Track};

/// How `min_hits` affects which tracks are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinHitsPolicy {
    /// `min_hits` is stored but has no effect; every live track is reported.
    #[default]
    Inert,
    /// Only tracks matched at least `min_hits` times are reported.
    Gate,
}

/// Configuration for the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum center distance (exclusive) for a detection to match a track.
    pub distance_threshold: f64,

    /// Consecutive unmatched updates after which a track is evicted.
    pub max_age: u32,

    /// Matches required before a track is reported under [`MinHitsPolicy::Gate`].
    pub min_hits: u32,

    /// Whether `min_hits` gates reporting.
    pub min_hits_policy: MinHitsPolicy,

    /// Only track detections with these labels (all labels when `None`).
    pub classes: Option<Vec<String>>,

    /// Minimum detection confidence to be tracked.
    pub min_confidence: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 50.0,
            max_age: 30,
            min_hits: 3,
            min_hits_policy: MinHitsPolicy::Inert,
            classes: None,
            min_confidence: 0.0,
        }
    }
}

impl TrackerConfig {
    /// Create a tracker configuration with the given distance threshold and max age.
    ///
    /// # Arguments
    /// * `distance_threshold` - Maximum match distance
    /// * `max_age` - Missed updates before eviction
    pub fn new(distance_threshold: f64, max_age: u32) -> Self {
        Self {
            distance_threshold,
            max_age,
            ..Self::default()
        }
    }

    /// Restrict tracking to the given class labels.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    /// Check the configuration for values the tracker cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "distance_threshold must be positive, got {}",
                self.distance_threshold
            )));
        }

        if self.max_age == 0 {
            return Err(Error::InvalidConfig("max_age must be at least 1".to_string()));
        }

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::InvalidConfig(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }

        Ok(())
    }

    /// Whether a detection passes the class and confidence filters.
    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.confidence >= self.min_confidence
            && self
                .classes
                .as_ref()
                .map_or(true, |classes| classes.iter().any(|c| c == &detection.label))
    }
}

/// Object tracker.
///
/// Owns the track store (an insertion-ordered list, so association order is
/// reproducible) and updates it once per frame.
pub struct Tracker {
    /// Tracker configuration.
    pub config: TrackerConfig,

    /// Live tracks in creation order.
    tracks: Vec<Track>,

    /// Local ID issuer.
    ids: TrackIdFactory,

    /// IDs evicted by the most recent update.
    last_evicted: Vec<u64>,
}

impl Tracker {
    /// Create a new tracker with the given configuration.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            tracks: Vec::new(),
            ids: TrackIdFactory::new(),
            last_evicted: Vec::new(),
        })
    }

    /// Update the tracker with the detections of one frame.
    ///
    /// Detections rejected by the class/confidence filter are ignored.
    ///
    /// # Returns
    /// The tracks visible under the configured [`MinHitsPolicy`]
    pub fn update(&mut self, detections: &[Detection]) -> Vec<&Track> {
        let threshold = self.config.distance_threshold;
        let mut touched = vec![false; self.tracks.len()];
        let accepted: Vec<&Detection> = detections.iter().filter(|d| self.config.accepts(d)).collect();

        for detection in accepted {
            let center = detection.center();

            match first_match(&self.tracks, &center, threshold) {
                Some(idx) => {
                    let track = &mut self.tracks[idx];
                    track.center = center;
                    track.age = 0;
                    track.label.clone_from(&detection.label);
                    // Count one hit per call even when several detections land on the track
                    if !touched[idx] {
                        track.hit_streak += 1;
                        track.hits += 1;
                        touched[idx] = true;
                    }
                }
                None => {
                    self.create_track(center, &detection.label);
                    touched.push(true);
                }
            }
        }

        // Age everything that was not matched this call
        for (track, &was_touched) in self.tracks.iter_mut().zip(touched.iter()) {
            if !was_touched {
                track.age += 1;
                track.hit_streak = 0;
            }
        }

        let max_age = self.config.max_age;
        self.last_evicted.clear();
        let evicted = &mut self.last_evicted;
        self.tracks.retain(|track| {
            if track.age >= max_age {
                debug!(track_id = track.id, age = track.age, "evicting stale track");
                evicted.push(track.id);
                false
            } else {
                true
            }
        });

        self.visible().collect()
    }

    /// Get `(id, center)` for every reported track.
    pub fn get_tracks(&self) -> Vec<(u64, Point2<f64>)> {
        self.visible().map(|track| (track.id, track.center)).collect()
    }

    /// Tracks reported under the configured [`MinHitsPolicy`].
    pub fn confirmed_tracks(&self) -> Vec<&Track> {
        self.visible().collect()
    }

    /// All live tracks, including ones hidden by [`MinHitsPolicy::Gate`].
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Look up a live track by ID.
    pub fn get(&self, id: u64) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == id)
    }

    /// IDs of the tracks evicted by the most recent update.
    pub fn last_evicted(&self) -> &[u64] {
        &self.last_evicted
    }

    /// Get the total number of track IDs issued.
    pub fn total_track_count(&self) -> u64 {
        self.ids.issued()
    }

    /// Get the current number of reported tracks.
    pub fn current_track_count(&self) -> usize {
        self.visible().count()
    }

    /// Drop every track. IDs keep increasing after a reset.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.last_evicted.clear();
    }

    fn visible(&self) -> impl Iterator<Item = &Track> {
        let gate = match self.config.min_hits_policy {
            MinHitsPolicy::Inert => 0,
            MinHitsPolicy::Gate => self.config.min_hits,
        };
        self.tracks.iter().filter(move |track| track.hits >= gate)
    }

    // Internal: create new track
    fn create_track(&mut self, center: Point2<f64>, label: &str) {
        let (id, global_id) = self.ids.next_ids();
        debug!(track_id = id, x = center.x, y = center.y, label, "created track");
        self.tracks.push(Track::new(id, global_id, center, label));
    }
}
