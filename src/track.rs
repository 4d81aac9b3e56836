//! Track record and ID management.

use nalgebra::Point2;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global ID counter, unique across all trackers in the process.
static GLOBAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Get the next global ID (unique across all trackers).
/// Uses Relaxed ordering since we only need uniqueness, not memory ordering.
#[inline]
pub fn get_next_global_id() -> u64 {
    GLOBAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Issues track IDs for a single tracker.
///
/// Local IDs start at 0 and are never reused by the same tracker. Each track
/// also receives a global ID that no other tracker in the process will hand out.
#[derive(Debug, Default, Clone)]
pub struct TrackIdFactory {
    next_id: u64,
}

impl TrackIdFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (local_id, global_id) for a new track.
    pub fn next_ids(&mut self) -> (u64, u64) {
        let id = self.next_id;
        self.next_id += 1;
        (id, get_next_global_id())
    }

    /// Number of local IDs issued so far.
    pub fn issued(&self) -> u64 {
        self.next_id
    }
}

/// A persistent identity for a moving object.
///
/// Tracks are owned by the [`Tracker`](crate::Tracker) and only change
/// through its `update` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Tracker-local ID, monotonically assigned.
    pub id: u64,

    /// ID unique across all trackers in the process.
    pub global_id: u64,

    /// Center of the last matched detection.
    pub center: Point2<f64>,

    /// Update calls since the last match (0 = matched this call).
    pub age: u32,

    /// Consecutive update calls with a match.
    pub hit_streak: u32,

    /// Total update calls with a match, creation included.
    pub hits: u32,

    /// Class label of the last matched detection.
    pub label: String,
}

impl Track {
    pub(crate) fn new(id: u64, global_id: u64, center: Point2<f64>, label: &str) -> Self {
        Self {
            id,
            global_id,
            center,
            age: 0,
            hit_streak: 1,
            hits: 1,
            label: label.to_string(),
        }
    }

    /// Whether the track was matched in the most recent update.
    pub fn is_matched(&self) -> bool {
        self.age == 0
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track(id={}, label={}, center=({:.1}, {:.1}), age={}, hit_streak={})",
            self.id, self.label, self.center.x, self.center.y, self.age, self.hit_streak
        )
    }
}
