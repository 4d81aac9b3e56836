//! Detection types for input to the tracker and anomaly detectors.

use crate::{Error, Result};
use nalgebra::Point2;
use serde::Deserialize;
use tracing::warn;

/// Axis-aligned bounding box in pixel coordinates.
///
/// Always satisfies `x1 < x2` and `y1 < y2` with finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a bounding box from its top-left and bottom-right corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        let finite = [x1, y1, x2, y2].iter().all(|v| v.is_finite());
        if !finite || x1 >= x2 || y1 >= y2 {
            return Err(Error::InvalidBoundingBox { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Create a bounding box from a `[x1, y1, x2, y2]` slice.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [x1, y1, x2, y2] => Self::new(*x1, *y1, *x2, *y2),
            _ => Err(Error::InvalidDetection(format!(
                "bbox must have 4 values, got {}",
                values.len()
            ))),
        }
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Point2<f64> {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn top_left(&self) -> Point2<f64> {
        Point2::new(self.x1, self.y1)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Whether `point` lies inside the box (edges inclusive).
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }
}

/// A validated detection produced by the external object detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Class label (e.g. "person", "cell phone").
    pub label: String,

    /// Detector confidence in [0, 1].
    pub confidence: f64,

    /// Bounding box of the detected object.
    pub bbox: BoundingBox,
}

impl Detection {
    /// Create a new detection, validating every field.
    ///
    /// # Arguments
    /// * `label` - Class label, must be non-empty
    /// * `confidence` - Score in [0, 1]
    /// * `bbox` - Already validated bounding box
    pub fn new(label: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Result<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(Error::InvalidDetection("empty class label".to_string()));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::InvalidDetection(format!(
                "confidence {} outside [0, 1]",
                confidence
            )));
        }
        Ok(Self { label, confidence, bbox })
    }

    /// Create a detection from raw bbox coordinates.
    pub fn from_coords(label: impl Into<String>, confidence: f64, bbox: [f64; 4]) -> Result<Self> {
        Self::new(label, confidence, BoundingBox::from_slice(&bbox)?)
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Point2<f64> {
        self.bbox.center()
    }

    pub fn is_class(&self, label: &str) -> bool {
        self.label == label
    }
}

/// Untyped detector output as it arrives over the wire.
///
/// Every field is optional so that a single malformed entry can be rejected
/// without failing the whole frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetection {
    #[serde(default, alias = "label")]
    pub class_name: Option<String>,

    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
}

impl RawDetection {
    pub fn new(class_name: &str, confidence: f64, bbox: [f64; 4]) -> Self {
        Self {
            class_name: Some(class_name.to_string()),
            confidence: Some(confidence),
            bbox: Some(bbox.to_vec()),
        }
    }
}

impl TryFrom<RawDetection> for Detection {
    type Error = Error;

    fn try_from(raw: RawDetection) -> Result<Self> {
        let label = raw
            .class_name
            .ok_or_else(|| Error::InvalidDetection("missing class label".to_string()))?;
        let confidence = raw
            .confidence
            .ok_or_else(|| Error::InvalidDetection("missing confidence".to_string()))?;
        let bbox = raw
            .bbox
            .ok_or_else(|| Error::InvalidDetection("missing bbox".to_string()))?;
        Detection::new(label, confidence, BoundingBox::from_slice(&bbox)?)
    }
}

/// Validate a whole frame of raw detections.
///
/// Malformed entries are logged and skipped; the rest of the frame is kept.
pub fn parse_frame(raw: Vec<RawDetection>) -> Vec<Detection> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(idx, det)| match Detection::try_from(det) {
            Ok(det) => Some(det),
            Err(e) => {
                warn!(index = idx, error = %e, "skipping malformed detection");
                None
            }
        })
        .collect()
}

/// Keep detections of the given classes (all when `None`) scoring at least
/// `min_confidence`.
pub fn filter_detections(
    detections: &[Detection],
    classes: Option<&[String]>,
    min_confidence: f64,
) -> Vec<Detection> {
    detections
        .iter()
        .filter(|det| det.confidence >= min_confidence)
        .filter(|det| classes.map_or(true, |cls| cls.iter().any(|c| c == &det.label)))
        .cloned()
        .collect()
}
