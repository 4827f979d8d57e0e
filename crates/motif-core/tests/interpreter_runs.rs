//! Fixture-driven interpreter runs against recording handles.

use motif_core::schema::Document;
use motif_core::{
    resolve, Interpreter, RecordedCall, RecordingHandle, RecordingLog, RuntimeEvent, TargetUpdate,
};
use motif_test_fixtures as fixtures;

fn load(name: &str) -> Document {
    fixtures::documents::load(name).expect("fixture should load")
}

fn interpreter_with_handles(doc: &Document, ids: &[&str]) -> (Interpreter, RecordingLog) {
    let resolution = resolve(doc);
    assert!(resolution.errors.is_empty(), "{:?}", resolution.errors);
    let mut interp = Interpreter::new(resolution.data);
    let log = RecordingLog::default();
    for id in ids {
        interp.register_handle(*id, Box::new(RecordingHandle::new(*id, log.clone())));
    }
    (interp, log)
}

fn calls(log: &RecordingLog) -> Vec<RecordedCall> {
    log.lock().unwrap().clone()
}

/// it should release center-staggered targets at [200,100,0,100,200] ms
#[test]
fn stagger_grid_release_times() {
    let doc = load("stagger-grid");
    let tiles = ["tile-1", "tile-2", "tile-3", "tile-4", "tile-5"];
    let (mut interp, log) = interpreter_with_handles(&doc, &tiles);
    interp.play();
    interp.advance(1.0);
    let fired = calls(&log);
    assert_eq!(fired.len(), 5);
    let at = |id: &str| fired.iter().find(|c| c.target == id).unwrap().at_s;
    assert!((at("tile-1") - 0.2).abs() < 1e-9);
    assert!((at("tile-2") - 0.1).abs() < 1e-9);
    assert!((at("tile-3") - 0.0).abs() < 1e-9);
    assert!((at("tile-4") - 0.1).abs() < 1e-9);
    assert!((at("tile-5") - 0.2).abs() < 1e-9);
}

/// it should chain sequence-group children and overlap parallel ones
#[test]
fn dashboard_group_timing() {
    let doc = load("dashboard");
    let (mut interp, log) = interpreter_with_handles(&doc, &["panel", "chart", "legend"]);
    interp.play();
    interp.advance(2.0);
    let fired = calls(&log);
    let at = |id: &str| fired.iter().find(|c| c.target == id).unwrap().at_s;
    // panel first, then the parallel pair together after panel's 250ms.
    assert!((at("panel") - 0.0).abs() < 1e-9);
    assert!((at("chart") - 0.25).abs() < 1e-9);
    assert!((at("legend") - 0.25).abs() < 1e-9);
    // Sequence completion waits for the slowest parallel child (600ms),
    // so the whole run spans 850ms.
    let events = interp.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::SequenceFinished { id } if id == "assemble")));
    assert!(interp.now() >= 0.85);
}

/// it should reset every handle to the element's initial state on stop
#[test]
fn stop_restores_initial_states() {
    let doc = load("card-intro");
    let (mut interp, log) = interpreter_with_handles(&doc, &["card", "title"]);
    interp.play();
    interp.advance(0.2);
    interp.stop();
    let fired = calls(&log);
    let last_card = fired
        .iter()
        .rev()
        .find(|c| c.target == "card")
        .expect("card should receive a reset");
    match &last_card.update {
        TargetUpdate::Set(state) => {
            // initial.x is "${slide * 2}" with slide = 24.
            assert_eq!(state.number("x"), Some(48.0));
            assert_eq!(state.number("y"), Some(16.0));
            assert_eq!(state.number("opacity"), Some(0.0));
        }
        other => panic!("expected a snap to initial, got {other:?}"),
    }
    let last_title = fired
        .iter()
        .rev()
        .find(|c| c.target == "title")
        .expect("title should receive a reset");
    assert!(matches!(last_title.update, TargetUpdate::Set(_)));
}

/// it should complete a run even when a targeted element does not exist
#[test]
fn dangling_target_is_skipped_not_fatal() {
    let json = r#"{
        "version": "1.0",
        "elements": {"badge": {"type": "box", "initial": {"opacity": 0}}},
        "timeline": {"sequences": [{
            "id": "fade",
            "trigger": {"type": "mount"},
            "animations": [
                {"type": "transition", "target": ["card", "badge"], "to": {"opacity": 1}, "duration": 100}
            ]
        }]}
    }"#;
    let doc: Document = serde_json::from_str(json).unwrap();
    let (mut interp, log) = interpreter_with_handles(&doc, &["badge"]);
    interp.play();
    interp.advance(1.0);
    let fired = calls(&log);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].target, "badge");
    let events = interp.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::TargetMissing { id } if id == "card")));
    assert!(events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::SequenceFinished { id } if id == "fade")));
    assert!(interp.is_settled());
}

/// it should hand a keyframes block to the handle in one call
#[test]
fn pulse_keyframes_fire_once_per_iteration() {
    let doc = load("pulse-loop");
    let (mut interp, log) = interpreter_with_handles(&doc, &["dot"]);
    interp.play();
    interp.advance(0.9);
    let fired = calls(&log);
    assert_eq!(fired.len(), 1);
    match &fired[0].update {
        TargetUpdate::Keyframes { frames, duration_s, .. } => {
            assert_eq!(frames.len(), 3);
            assert!((frames[1].time - 0.6).abs() < 1e-9);
            assert_eq!(frames[1].state.number("scale"), Some(1.15));
            assert!((duration_s - 0.8).abs() < 1e-9);
        }
        other => panic!("expected keyframes, got {other:?}"),
    }
    // Infinite repeat: next iteration fires after duration + 200ms gap.
    interp.advance(0.2);
    assert_eq!(calls(&log).len(), 2);
}
