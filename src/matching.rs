//! Detection-to-track association.
//!
//! Association is a greedy first-match scan: for each detection center the
//! first track (in store order) closer than the distance threshold wins. A
//! nearer track later in the order is not preferred.

use nalgebra::{distance, Point2};

use crate::Track;

/// Outcome of associating one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// Matched the track at this index of the store.
    Matched(usize),
    /// No track within range; a new track will be created.
    New,
}

/// Euclidean distance between two centers.
#[inline]
pub fn euclidean(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    distance(a, b)
}

/// Index of the first track whose center lies strictly within `threshold`.
pub fn first_match(tracks: &[Track], center: &Point2<f64>, threshold: f64) -> Option<usize> {
    tracks
        .iter()
        .position(|track| euclidean(&track.center, center) < threshold)
}

/// Associate a batch of detection centers against a fixed snapshot of tracks.
///
/// Several detections may be associated with the same track; exclusivity is
/// not enforced.
pub fn associate(tracks: &[Track], centers: &[Point2<f64>], threshold: f64) -> Vec<Association> {
    centers
        .iter()
        .map(|center| match first_match(tracks, center, threshold) {
            Some(idx) => Association::Matched(idx),
            None => Association::New,
        })
        .collect()
}
