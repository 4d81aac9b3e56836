//! Tracker and detector benchmarks using Criterion.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vigil_rs::config::InteractionConfig;
use vigil_rs::{
    Detection, FixedZone, InteractionDetector, ManualClock, Monitor, MonitorConfig, RawDetection,
    Tracker, TrackerConfig,
};

/// Create `n` well-separated detections for benchmarking.
fn create_test_detections(n: usize) -> Vec<Detection> {
    (0..n)
        .map(|i| {
            let x = (i * 100) as f64;
            let y = (i * 50) as f64;
            Detection::from_coords("person", 0.9, [x, y, x + 50.0, y + 50.0]).expect("valid detection")
        })
        .collect()
}

fn benchmark_tracker_update(c: &mut Criterion, n: usize) {
    let mut tracker = Tracker::new(TrackerConfig::new(50.0, 30)).expect("valid tracker");
    let detections = create_test_detections(n);

    c.bench_function(&format!("tracker_update_{}_objects", n), |b| {
        b.iter(|| {
            black_box(tracker.update(black_box(&detections)).len());
        })
    });
}

fn benchmark_tracker_update_10_objects(c: &mut Criterion) {
    benchmark_tracker_update(c, 10);
}

fn benchmark_tracker_update_50_objects(c: &mut Criterion) {
    benchmark_tracker_update(c, 50);
}

fn benchmark_tracker_update_100_objects(c: &mut Criterion) {
    benchmark_tracker_update(c, 100);
}

/// Tracks appear and vanish every frame, exercising creation and eviction.
fn benchmark_tracker_churn(c: &mut Criterion) {
    let mut tracker = Tracker::new(TrackerConfig::new(50.0, 2)).expect("valid tracker");
    let frames: Vec<Vec<Detection>> = (0..4)
        .map(|f| {
            create_test_detections(25)
                .into_iter()
                .map(|d| {
                    let b = &d.bbox;
                    let shift = f as f64 * 1000.0;
                    Detection::from_coords("person", 0.9, [b.x1 + shift, b.y1, b.x2 + shift, b.y2])
                        .expect("valid detection")
                })
                .collect()
        })
        .collect();

    c.bench_function("tracker_churn_25_objects", |b| {
        let mut frame = 0;
        b.iter(|| {
            black_box(tracker.update(black_box(&frames[frame % frames.len()])).len());
            frame += 1;
        })
    });
}

fn benchmark_interaction_update(c: &mut Criterion) {
    let clock = ManualClock::new(0.0);
    let mut detector =
        InteractionDetector::with_clock(InteractionConfig::default(), clock).expect("valid detector");
    let mut detections = create_test_detections(20);
    detections.extend((0..20).map(|i| {
        let x = (i * 100) as f64 + 10.0;
        let y = (i * 50) as f64 + 10.0;
        Detection::from_coords("cell phone", 0.7, [x, y, x + 20.0, y + 20.0]).expect("valid detection")
    }));

    c.bench_function("interaction_update_20_pairs", |b| {
        let mut frame_id = 0;
        b.iter(|| {
            frame_id += 1;
            black_box(detector.update(black_box(&detections), frame_id, Some("Lobby")).len());
        })
    });
}

fn benchmark_monitor_process_frame(c: &mut Criterion) {
    let clock = ManualClock::new(0.0);
    let mut monitor = Monitor::with_clock(MonitorConfig::default(), clock.clone())
        .expect("valid monitor")
        .with_zone_resolver(FixedZone::new("flag_room"));
    let raw: Vec<RawDetection> = create_test_detections(50)
        .iter()
        .map(|d| RawDetection::new(&d.label, d.confidence, [d.bbox.x1, d.bbox.y1, d.bbox.x2, d.bbox.y2]))
        .collect();

    c.bench_function("monitor_process_frame_50_objects", |b| {
        b.iter(|| {
            clock.advance(0.04);
            black_box(monitor.process_frame(black_box(raw.clone()), Some("Gate 3")).len());
        })
    });
}

criterion_group!(
    benches,
    benchmark_tracker_update_10_objects,
    benchmark_tracker_update_50_objects,
    benchmark_tracker_update_100_objects,
    benchmark_tracker_churn,
    benchmark_interaction_update,
    benchmark_monitor_process_frame,
);

criterion_main!(benches);
