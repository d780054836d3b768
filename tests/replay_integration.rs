use lamco_motion_predict::event::{MotionEvent, PointerAction, PointerCoords};
use lamco_motion_predict::predictor::{MotionEventPredictor, PredictorConfig};
use lamco_motion_predict::replay::{load_trace, replay, ReplayFrame};
use std::path::PathBuf;
use tempfile::TempDir;

fn demo_trace() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/straight_stroke.json")
}

#[test]
fn test_demo_trace_replays() {
    let events = load_trace(demo_trace()).unwrap();
    assert!(!events.is_empty());
    assert_eq!(events[0].action, PointerAction::Down);

    let mut predictor = MotionEventPredictor::new(&PredictorConfig::default()).unwrap();
    let report = replay(&mut predictor, &events);

    assert_eq!(report.frames.len(), events.len());
    assert_eq!(report.summary.events, events.len());
    // Down plus two moves are not enough history
    assert_eq!(report.summary.not_ready, 3);
    assert!(report.summary.predicted_samples > 0);
    assert!(report.summary.max_horizon >= 1);
}

#[test]
fn test_trace_roundtrip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trace.json");

    let events: Vec<MotionEvent> = (0..12)
        .map(|i| {
            let action = if i == 0 {
                PointerAction::Down
            } else {
                PointerAction::Move
            };
            MotionEvent::single(action, 0, i * 8, PointerCoords::new(i as f32 * 6.0, 0.0, 1.0))
        })
        .collect();
    std::fs::write(&path, serde_json::to_string(&events).unwrap()).unwrap();

    let loaded = load_trace(&path).unwrap();
    assert_eq!(loaded, events);
}

#[test]
fn test_invalid_trace_event_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    // Two pointer ids but only one coordinate set
    let trace = r#"[{
        "action": "down",
        "pointer_ids": [0, 1],
        "samples": [{"time_ms": 0, "coords": [{"x": 1.0, "y": 2.0}]}]
    }]"#;
    std::fs::write(&path, trace).unwrap();

    let err = load_trace(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Pointer count mismatch"));
}

#[test]
fn test_frames_serialize_as_json_lines() {
    let frame = ReplayFrame {
        time_ms: Some(16),
        handled: true,
        prediction: None,
    };
    let line = serde_json::to_string(&frame).unwrap();
    assert_eq!(line, r#"{"time_ms":16,"handled":true,"prediction":null}"#);
}
