// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the fallwatch library

use fallwatch::classifier::{assess, score};
use fallwatch::cli::replay::replay;
use fallwatch::worker::FrameWorker;
use fallwatch::{
    DebounceState, EmotionClassifier, EmotionLabel, Engine, EngineConfig, FallConfig, Landmark,
    ObjectSignal, Pose, PoseGeometry, Trigger,
};

/// Upright trunk, knees flexed 30° off straight.
fn standing() -> Pose {
    let (sx, sy) = (0.2 * 30f64.to_radians().sin(), 0.2 * 30f64.to_radians().cos());
    Pose::builder()
        .point(Landmark::Neck, 0.5, 0.2, 0.95)
        .point(Landmark::LeftHip, 0.45, 0.5, 0.95)
        .point(Landmark::RightHip, 0.55, 0.5, 0.95)
        .point(Landmark::LeftKnee, 0.45, 0.7, 0.95)
        .point(Landmark::RightKnee, 0.55, 0.7, 0.95)
        .point(Landmark::LeftAnkle, 0.45 + sx, 0.7 + sy, 0.95)
        .point(Landmark::RightAnkle, 0.55 + sx, 0.7 + sy, 0.95)
        .build()
}

/// Lying flat with straight legs.
fn prone() -> Pose {
    Pose::builder()
        .point(Landmark::Neck, 0.1, 0.85, 0.9)
        .point(Landmark::LeftHip, 0.45, 0.83, 0.9)
        .point(Landmark::RightHip, 0.45, 0.87, 0.9)
        .point(Landmark::LeftKnee, 0.65, 0.83, 0.9)
        .point(Landmark::RightKnee, 0.65, 0.87, 0.9)
        .point(Landmark::LeftAnkle, 0.85, 0.83, 0.9)
        .point(Landmark::RightAnkle, 0.85, 0.87, 0.9)
        .build()
}

fn feed(engine: &mut Engine, pose: &Pose, frames: usize) -> usize {
    (0..frames)
        .filter(|_| engine.observe_frame(pose, None).is_some())
        .count()
}

#[test]
fn test_low_confidence_pose_never_scores() {
    let mut builder = Pose::builder();
    for landmark in Landmark::ALL {
        builder = builder.point(landmark, 0.3, 0.9, 0.5);
    }
    let result = assess(&builder.build(), &FallConfig::default());
    assert!(result.score.abs() < f64::EPSILON);
    assert!(!result.exceeds_threshold);
    assert_eq!(result.geometry, PoseGeometry::default());
}

#[test]
fn test_canonical_standing_scores_zero() {
    let exact = score(
        PoseGeometry {
            trunk_angle: Some(0.0),
            leg_angle: Some(150.0),
        },
        &FallConfig::default(),
    );
    assert!(exact.score.abs() < f64::EPSILON);

    let measured = assess(&standing(), &FallConfig::default());
    assert!(measured.score < 1e-6, "got {}", measured.score);
    assert!(!measured.exceeds_threshold);
}

#[test]
fn test_prone_scores_high() {
    let bent = score(
        PoseGeometry {
            trunk_angle: Some(80.0),
            leg_angle: Some(150.0),
        },
        &FallConfig::default(),
    );
    assert!(bent.score >= 0.6 - 1e-9);

    let result = assess(&prone(), &FallConfig::default());
    assert!(result.score >= 0.6, "got {}", result.score);
    assert!(result.exceeds_threshold);
}

#[test]
fn test_interrupted_run_never_confirms() {
    let mut engine = Engine::default();
    assert_eq!(feed(&mut engine, &prone(), 4), 0);
    assert_eq!(feed(&mut engine, &standing(), 1), 0);
    assert_eq!(feed(&mut engine, &prone(), 4), 0);
    assert_ne!(engine.fall_state(), DebounceState::Confirmed);
}

#[test]
fn test_five_frames_confirm_exactly_once() {
    let mut engine = Engine::default();
    assert_eq!(feed(&mut engine, &prone(), 5), 1);
    assert_eq!(engine.fall_state(), DebounceState::Confirmed);
    assert_eq!(feed(&mut engine, &prone(), 1), 0);
}

#[test]
fn test_instant_signal_from_any_counter_state() {
    for warmup in 0..5 {
        let mut engine = Engine::default();
        feed(&mut engine, &prone(), warmup);
        let event = engine
            .observe_frame(&standing(), Some(&ObjectSignal::new("fall", 0.75)))
            .unwrap();
        assert_eq!(event.triggered_by, Trigger::ObjectInstant);
        assert!((event.confidence - 0.75).abs() < f64::EPSILON);
        assert_eq!(engine.fall_state(), DebounceState::Confirmed);
    }
}

#[test]
fn test_cancel_requires_full_rerun() {
    let mut engine = Engine::default();
    assert_eq!(feed(&mut engine, &prone(), 5), 1);
    engine.cancel_active_event();
    assert_eq!(feed(&mut engine, &prone(), 4), 0);
    assert_eq!(feed(&mut engine, &prone(), 1), 1);
}

#[test]
fn test_emotion_properties() {
    let classifier = EmotionClassifier::default();

    let happy = classifier.classify("开心", 0.0);
    assert_eq!(happy.label, EmotionLabel::Happy);
    assert!(happy.confidence >= 0.6);

    let empty = classifier.classify("", 0.0);
    assert_eq!(empty.label, EmotionLabel::Unknown);
    assert!(empty.confidence.abs() < f64::EPSILON);

    let fallback = classifier.classify("the weather report", 0.5);
    assert_eq!(fallback.label, EmotionLabel::Happy);
}

#[test]
fn test_classify_text_is_deterministic() {
    let engine = Engine::default();
    for (text, sentiment) in [("有点担心", -0.2), ("太棒了 好开心", 0.9), ("ok", 0.0)] {
        let first = engine.classify_text(text, sentiment);
        let second = engine.classify_text(text, sentiment);
        assert_eq!(first.label, second.label);
        assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
    }
}

#[test]
fn test_config_file_drives_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fallwatch.yaml");
    std::fs::write(&path, "fall:\n  debounce_frames: 2\n").unwrap();

    let config = EngineConfig::load(&path).unwrap();
    let mut engine = Engine::new(config).unwrap();
    assert_eq!(feed(&mut engine, &prone(), 2), 1);
}

#[test]
fn test_worker_matches_direct_engine() {
    let frames = vec![
        prone(),
        prone(),
        standing(),
        prone(),
        prone(),
        prone(),
        prone(),
        prone(),
    ];

    let mut direct = Engine::default();
    let expected: Vec<_> = frames
        .iter()
        .filter_map(|pose| direct.observe_frame(pose, None))
        .collect();

    let (tx, rx) = std::sync::mpsc::channel();
    let worker = FrameWorker::spawn(Engine::default(), move |event| {
        tx.send(event).unwrap();
    })
    .unwrap();
    for pose in frames {
        assert!(worker.submit(pose, None));
    }
    worker.shutdown().unwrap();

    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(received, expected);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].frame_index, 7);
}

#[test]
fn test_replay_demo_stream() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/frames.jsonl");
    let reader = std::io::BufReader::new(std::fs::File::open(path).unwrap());
    let mut engine = Engine::default();
    let mut out = Vec::new();

    let summary = replay(&mut engine, reader, &mut out).unwrap();
    assert_eq!(summary.frames, 13);
    assert_eq!(summary.commands, 1);
    assert_eq!(summary.skipped, 0);

    let events: Vec<fallwatch::FallEvent> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].triggered_by, Trigger::PoseDebounced);
    assert_eq!(events[0].frame_index, 10);
    assert_eq!(events[1].triggered_by, Trigger::ObjectInstant);
    assert_eq!(events[1].frame_index, 12);
}
