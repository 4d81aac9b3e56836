//! Scenario fixture tests for vigil-rs.
//!
//! Each fixture under `tests/fixtures/` scripts a sequence of inputs together
//! with the expected state after every step, so regressions show up as the
//! first diverging step rather than a final mismatch.
//!
//! Run with: cargo test fixture

use approx::assert_relative_eq;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use vigil_rs::{Detection, LoiteringDetector, ManualClock, Tracker, TrackerConfig, ZoneTable};

// ============================================================================
// Fixture JSON Schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct TrackerFixture {
    tracker_config: TrackerConfigJson,
    steps: Vec<TrackerStep>,
}

#[derive(Debug, Deserialize)]
struct TrackerConfigJson {
    distance_threshold: f64,
    max_age: u32,
}

#[derive(Debug, Deserialize)]
struct TrackerStep {
    frame_id: usize,
    inputs: TrackerInputs,
    outputs: TrackerOutputs,
}

#[derive(Debug, Deserialize)]
struct TrackerInputs {
    detections: Vec<DetectionJson>,
}

#[derive(Debug, Deserialize)]
struct DetectionJson {
    label: String,
    confidence: f64,
    bbox: [f64; 4],
}

#[derive(Debug, Deserialize)]
struct TrackerOutputs {
    tracks: Vec<TrackJson>,
    evicted: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct TrackJson {
    id: u64,
    center: [f64; 2],
    age: u32,
    hit_streak: u32,
}

#[derive(Debug, Deserialize)]
struct LoiteringFixture {
    zones: ZoneTable,
    events: Vec<LoiteringEvent>,
    ledger: Vec<RecordJson>,
    summary: SummaryJson,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Action {
    Update,
    Exit,
}

#[derive(Debug, Deserialize)]
struct LoiteringEvent {
    time: f64,
    action: Action,
    subject: String,
    zone: Option<String>,
    alert: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordJson {
    subject_id: String,
    timestamp: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct SummaryJson {
    total_anomalies: usize,
    average_duration: f64,
}

// ============================================================================
// Test Helpers
// ============================================================================

fn find_fixture_dir() -> PathBuf {
    let candidates = [
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"),
        PathBuf::from("tests/fixtures"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return candidate.clone();
        }
    }
    panic!("Could not find tests/fixtures directory");
}

fn load_fixture<T: for<'de> Deserialize<'de>>(scenario: &str) -> T {
    let path = find_fixture_dir().join(format!("fixture_{}.json", scenario));

    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));

    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

fn to_detections(inputs: &TrackerInputs) -> Vec<Detection> {
    inputs
        .detections
        .iter()
        .map(|d| Detection::from_coords(d.label.as_str(), d.confidence, d.bbox).expect("valid fixture detection"))
        .collect()
}

// ============================================================================
// Tracker Fixtures
// ============================================================================

fn run_tracker_fixture(scenario: &str) {
    let fixture: TrackerFixture = load_fixture(scenario);
    let config = TrackerConfig::new(
        fixture.tracker_config.distance_threshold,
        fixture.tracker_config.max_age,
    );
    let mut tracker = Tracker::new(config).expect("Failed to create tracker");

    for (step_idx, step) in fixture.steps.iter().enumerate() {
        tracker.update(&to_detections(&step.inputs));

        let actual = tracker.tracks();
        assert_eq!(
            actual.len(),
            step.outputs.tracks.len(),
            "step {} (frame_id={}): track count mismatch, got {:?}",
            step_idx,
            step.frame_id,
            actual.iter().map(|t| t.id).collect::<Vec<_>>()
        );

        for (expected, track) in step.outputs.tracks.iter().zip(actual) {
            assert_eq!(track.id, expected.id, "step {}: id mismatch", step_idx);
            assert_eq!(track.age, expected.age, "step {}: age of track {}", step_idx, track.id);
            assert_eq!(
                track.hit_streak, expected.hit_streak,
                "step {}: hit_streak of track {}",
                step_idx, track.id
            );
            assert_relative_eq!(track.center.x, expected.center[0], epsilon = 1e-9);
            assert_relative_eq!(track.center.y, expected.center[1], epsilon = 1e-9);
        }

        assert_eq!(
            tracker.last_evicted(),
            step.outputs.evicted.as_slice(),
            "step {}: evicted ids",
            step_idx
        );
    }
}

#[test]
fn fixture_tracker_crossing() {
    run_tracker_fixture("tracker_crossing");
}

// ============================================================================
// Loitering Fixtures
// ============================================================================

fn run_loitering_fixture(scenario: &str) {
    let fixture: LoiteringFixture = load_fixture(scenario);
    let clock = ManualClock::new(0.0);
    let mut detector = LoiteringDetector::with_clock(fixture.zones, clock.clone());

    for (idx, event) in fixture.events.iter().enumerate() {
        clock.set(event.time);
        let alert = match (&event.action, &event.zone) {
            (Action::Update, Some(zone)) => detector.update(&event.subject, zone),
            (Action::Update, None) => panic!("event {}: update without zone", idx),
            (Action::Exit, _) => {
                detector.exit(&event.subject);
                None
            }
        };

        assert_eq!(
            alert.map(|a| a.message),
            event.alert,
            "event {} (t={}, subject={})",
            idx,
            event.time,
            event.subject
        );
    }

    let records = detector.ledger().records();
    assert_eq!(records.len(), fixture.ledger.len());
    for (record, expected) in records.iter().zip(&fixture.ledger) {
        assert_eq!(record.subject_id, expected.subject_id);
        assert_relative_eq!(record.timestamp, expected.timestamp, epsilon = 1e-9);
        assert_relative_eq!(record.duration, expected.duration, epsilon = 1e-9);
    }

    let summary = detector.ledger().summarize();
    assert_eq!(summary.total_anomalies, fixture.summary.total_anomalies);
    assert_relative_eq!(summary.average_duration, fixture.summary.average_duration, epsilon = 1e-9);
}

#[test]
fn fixture_loitering_timeline() {
    run_loitering_fixture("loitering_timeline");
}
