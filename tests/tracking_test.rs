use std::sync::{Arc, Mutex};

use ptz_autotrack::{
    ActuatorError, BoundingBox, CameraRegistry, CorrelationTracker, DeadZone, DetectionSnapshot,
    Direction, FaceDetection, Frame, PtzActuator, PtzBinding, PtzCommand, SharedSnapshot,
    TemplateTracker, TrackPhase, TrackingController,
};

/// Tracker that keeps reporting the box it was seeded with, unless told to
/// report a scripted prediction instead.
#[derive(Debug, Clone, Default)]
struct Still {
    bbox: BoundingBox,
    starts: Arc<Mutex<Vec<BoundingBox>>>,
    prediction: Option<BoundingBox>,
}

impl CorrelationTracker for Still {
    fn start(&mut self, _frame: &Frame, bbox: BoundingBox) {
        self.starts.lock().unwrap().push(bbox);
        self.bbox = bbox;
    }

    fn advance(&mut self, _frame: &Frame) -> BoundingBox {
        self.prediction.unwrap_or(self.bbox)
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl PtzActuator for Recorder {
    fn move_continuous(&mut self, pan: f32, tilt: f32) -> Result<(), ActuatorError> {
        self.0.lock().unwrap().push(format!("speed {pan} {tilt}"));
        Ok(())
    }

    fn move_discrete(&mut self, direction: Direction) -> Result<(), ActuatorError> {
        self.0.lock().unwrap().push(format!("move {direction}"));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.0.lock().unwrap().push("stop".into());
        Ok(())
    }
}

/// Actuator whose transport is down.
struct Unplugged;

impl PtzActuator for Unplugged {
    fn move_continuous(&mut self, _pan: f32, _tilt: f32) -> Result<(), ActuatorError> {
        Err(ActuatorError::Transport("connection refused".into()))
    }

    fn move_discrete(&mut self, _direction: Direction) -> Result<(), ActuatorError> {
        Err(ActuatorError::Disconnected)
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        Err(ActuatorError::Disconnected)
    }
}

const LEFT_BOX: BoundingBox = BoundingBox {
    left: 10.0,
    top: 40.0,
    right: 50.0,
    bottom: 60.0,
};
const CENTER_BOX: BoundingBox = BoundingBox {
    left: 200.0,
    top: 100.0,
    right: 400.0,
    bottom: 300.0,
};

fn frame() -> Frame {
    Frame::blank(800, 600)
}

fn seen(label: &str, bbox: BoundingBox) -> DetectionSnapshot {
    DetectionSnapshot::new(vec![FaceDetection::new(bbox, label, "93%")])
}

fn steering(tracker: Still, binding: Option<PtzBinding>) -> TrackingController<Still> {
    let mut controller = TrackingController::new("lobby", tracker);
    controller.set_actuator(binding);
    controller.set_tracked_identity(Some("alice".into()));
    controller.set_tracking_enabled(true);
    controller
}

#[test]
fn test_repeated_classification_dispatches_once() {
    let rec = Recorder::default();
    let mut controller = steering(Still::default(), Some(PtzBinding::continuous(rec.clone())));

    let snapshot = seen("alice", LEFT_BOX);
    controller.update(frame(), &snapshot);
    controller.update(frame(), &snapshot);
    controller.update(frame(), &DetectionSnapshot::default());

    assert_eq!(rec.calls(), ["speed 0.1 0"]);
    assert_eq!(controller.state().last_command(), Some(PtzCommand::Left));
    assert_eq!(controller.last_outcome().classified, Some(PtzCommand::Left));
    assert_eq!(controller.last_outcome().dispatched, None);
}

#[test]
fn test_snapshot_box_beats_prediction() {
    let tracker = Still {
        prediction: Some(BoundingBox::from_ltrb(700.0, 50.0, 750.0, 400.0)),
        ..Default::default()
    };
    let starts = Arc::clone(&tracker.starts);
    let rec = Recorder::default();
    let mut controller = steering(tracker, Some(PtzBinding::continuous(rec.clone())));

    controller.update(frame(), &seen("alice", CENTER_BOX));
    controller.update(frame(), &seen("alice", CENTER_BOX));
    assert_eq!(controller.state().phase(), TrackPhase::Seeded);
    assert_eq!(controller.state().last_box(), Some(CENTER_BOX));
    assert_eq!(*starts.lock().unwrap(), [CENTER_BOX, CENTER_BOX]);
    assert_eq!(rec.calls(), ["speed 0 0"]);

    // Identity drops out of the snapshot: the prediction takes over.
    controller.update(frame(), &DetectionSnapshot::default());
    assert_eq!(controller.state().phase(), TrackPhase::Predicting);
    assert_eq!(rec.calls(), ["speed 0 0", "speed -0.1 -0.1"]);
}

#[test]
fn test_800x600_scenarios() {
    let rec = Recorder::default();
    let mut controller = steering(Still::default(), Some(PtzBinding::discrete(rec.clone())));

    controller.update(frame(), &seen("alice", LEFT_BOX));
    controller.update(frame(), &seen("alice", CENTER_BOX));
    controller.update(frame(), &seen("alice", BoundingBox::from_ltrb(700.0, 50.0, 750.0, 400.0)));

    assert_eq!(rec.calls(), ["move left", "stop", "move down_right"]);
}

#[test]
fn test_other_faces_do_not_steer() {
    let rec = Recorder::default();
    let mut controller = steering(Still::default(), Some(PtzBinding::continuous(rec.clone())));

    let crowd = DetectionSnapshot::new(vec![
        FaceDetection::new(LEFT_BOX, "bob", "88%"),
        FaceDetection::new(CENTER_BOX, "Unknown", "40%"),
    ]);
    controller.update(frame(), &crowd);

    assert_eq!(controller.state().phase(), TrackPhase::Idle);
    assert!(rec.calls().is_empty());
}

#[test]
fn test_disable_resets_until_reseeded() {
    let rec = Recorder::default();
    let mut controller = steering(Still::default(), Some(PtzBinding::continuous(rec.clone())));

    controller.update(frame(), &seen("alice", LEFT_BOX));
    assert!(controller.state().track_active());

    controller.set_tracking_enabled(false);
    assert!(!controller.state().track_active());
    assert_eq!(controller.state().last_box(), None);
    assert_eq!(controller.state().last_command(), None);
    assert_eq!(rec.calls(), ["speed 0.1 0", "speed 0 0"]);

    rec.clear();
    controller.update(frame(), &seen("alice", LEFT_BOX));
    assert!(rec.calls().is_empty());
    assert_eq!(controller.state().phase(), TrackPhase::Idle);

    controller.set_tracking_enabled(true);
    controller.update(frame(), &DetectionSnapshot::default());
    assert!(rec.calls().is_empty());
    controller.update(frame(), &seen("alice", LEFT_BOX));
    assert_eq!(rec.calls(), ["speed 0.1 0"]);
}

#[test]
fn test_steering_without_actuator() {
    let mut controller = steering(Still::default(), None);
    controller.update(frame(), &seen("alice", LEFT_BOX));
    controller.update(frame(), &seen("alice", LEFT_BOX));

    assert_eq!(controller.state().phase(), TrackPhase::Seeded);
    assert_eq!(controller.last_outcome().classified, Some(PtzCommand::Left));
    assert_eq!(controller.state().last_command(), None);
    assert_eq!(controller.health().unbound_frames, 2);
}

#[test]
fn test_actuator_failures_are_reported() {
    let mut controller = steering(Still::default(), Some(PtzBinding::continuous(Unplugged)));
    let out = controller.update(frame(), &seen("alice", LEFT_BOX));

    assert_eq!(out.width(), 800);
    let health = controller.health();
    assert!(!health.is_healthy());
    assert_eq!(health.failures, 1);
    assert_eq!(
        health.last_error,
        Some(ActuatorError::Transport("connection refused".into()))
    );
}

#[test]
fn test_cameras_are_independent() {
    let (rec_a, rec_b) = (Recorder::default(), Recorder::default());
    let mut cameras = CameraRegistry::new();
    let a = cameras.insert(steering(Still::default(), Some(PtzBinding::continuous(rec_a.clone()))));
    let b = cameras.insert(steering(Still::default(), Some(PtzBinding::discrete(rec_b.clone()))));

    let snapshot_a = seen("alice", LEFT_BOX);
    cameras.get_mut(a).unwrap().update(frame(), &snapshot_a);
    cameras.get_mut(b).unwrap().update(frame(), &snapshot_a);

    // Camera B sees alice elsewhere, then loses her, then gets reconfigured.
    let b_controller = cameras.get_mut(b).unwrap();
    b_controller.update(frame(), &seen("alice", BoundingBox::from_ltrb(700.0, 50.0, 750.0, 400.0)));
    b_controller.update(frame(), &DetectionSnapshot::default());
    cameras.toggle_selection(b);
    let selected = cameras.selected_mut().unwrap();
    selected.set_tracked_identity(Some("bob".into()));
    selected.set_tracking_enabled(false);

    let a_state = cameras.get(a).unwrap();
    assert!(a_state.tracking_enabled());
    assert_eq!(a_state.tracked_identity(), Some("alice"));
    assert!(a_state.state().track_active());
    assert_eq!(a_state.state().last_box(), Some(LEFT_BOX));
    assert_eq!(a_state.state().last_command(), Some(PtzCommand::Left));
    assert_eq!(rec_a.calls(), ["speed 0.1 0"]);
    assert_eq!(rec_b.calls(), ["move left", "move down_right", "stop"]);

    // A keeps steering from its own snapshot alone.
    cameras.get_mut(a).unwrap().update(frame(), &snapshot_a);
    assert_eq!(rec_a.calls(), ["speed 0.1 0"]);
}

#[test]
fn test_resending_enabled_keeps_track() {
    let rec = Recorder::default();
    let mut controller = steering(Still::default(), Some(PtzBinding::continuous(rec.clone())));
    controller.update(frame(), &seen("alice", LEFT_BOX));

    for _ in 0..3 {
        controller.set_tracking_enabled(true);
        controller.update(frame(), &DetectionSnapshot::default());
    }
    controller.set_tracking_enabled(true);

    assert!(controller.state().track_active());
    assert_eq!(controller.state().phase(), TrackPhase::Predicting);
    assert_eq!(controller.state().last_command(), Some(PtzCommand::Left));
    assert_eq!(rec.calls(), ["speed 0.1 0"]);
}

#[test]
fn test_shared_snapshot_feeds_controller() {
    let shared = SharedSnapshot::new();
    let rec = Recorder::default();
    let mut controller = steering(Still::default(), Some(PtzBinding::continuous(rec.clone())));

    controller.update_shared(frame(), &shared);
    assert!(rec.calls().is_empty());

    shared.publish(seen("alice", CENTER_BOX));
    controller.update_shared(frame(), &shared);
    assert_eq!(rec.calls(), ["speed 0 0"]);
}

#[test]
fn test_template_tracker_holds_a_still_face() {
    let mut image = image::RgbImage::new(320, 240);
    for y in 80..140 {
        for x in 120..170 {
            let shade = ((x * 7 + y * 13) % 200) as u8 + 40;
            image.put_pixel(x, y, image::Rgb([shade, shade, shade]));
        }
    }
    let frame = Frame::new(image);
    let face = BoundingBox::from_ltrb(120.0, 80.0, 170.0, 140.0);

    let mut controller = TrackingController::new("desk", TemplateTracker::default());
    controller.set_tracked_identity(Some("alice".into()));
    controller.set_tracking_enabled(true);
    controller.update(frame.clone(), &seen("alice", face));
    controller.update(frame.clone(), &DetectionSnapshot::default());

    let predicted = controller.state().last_box().unwrap();
    assert_eq!(controller.state().phase(), TrackPhase::Predicting);
    assert!((predicted.left - face.left).abs() <= 2.0, "{predicted:?}");
    assert!((predicted.top - face.top).abs() <= 2.0, "{predicted:?}");
    assert_eq!(
        DeadZone::for_frame(320, 240).classify(&predicted),
        Some(PtzCommand::Stop)
    );
}
