//! Per-camera tracking controller.
//!
//! Invoked once per rendered frame on the render thread. Each call reads the
//! latest detection snapshot, runs the reseed/predict state machine for the
//! tracked identity, classifies the resulting box against the dead zone and
//! sends at most one debounced command to the camera's PTZ head. The frame is
//! always returned annotated, whatever happened to steering.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::{CameraConfig, OverlayConfig};
use crate::detection::{DetectionSnapshot, SharedSnapshot};
use crate::frame::Frame;
use crate::overlay::{Annotator, FpsCounter};
use crate::steering::{DeadZone, PtzBinding, PtzCommand, SteeringHealth};
use crate::tracker::{BoundingBox, CorrelationTracker, TemplateTracker, TrackPhase, TrackState};

/// What one [`TrackingController::update`] call decided.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutcome {
    pub phase: TrackPhase,
    /// Box classified against the dead zone, clipped to the frame.
    pub steering_box: Option<BoundingBox>,
    /// Classification before debouncing.
    pub classified: Option<PtzCommand>,
    /// Command the actuator accepted this frame.
    pub dispatched: Option<PtzCommand>,
}

/// Steering brain for one camera.
pub struct TrackingController<T: CorrelationTracker> {
    name: String,
    state: TrackState,
    /// Cloned fresh on every (re)seed.
    prototype: T,
    /// `Some` exactly while `state.track_active()`.
    tracker: Option<T>,
    actuator: Option<PtzBinding>,
    annotator: Annotator,
    fps: FpsCounter,
    health: SteeringHealth,
    last_outcome: FrameOutcome,
}

impl<T: CorrelationTracker> TrackingController<T> {
    /// Create a controller with tracking disabled and no actuator bound.
    pub fn new(name: impl Into<String>, prototype: T) -> Self {
        Self::with_overlay(name, prototype, Annotator::default())
    }

    pub fn with_overlay(name: impl Into<String>, prototype: T, annotator: Annotator) -> Self {
        let fps = FpsCounter::new(annotator.config().fps_window());
        Self {
            name: name.into(),
            state: TrackState::default(),
            prototype,
            tracker: None,
            actuator: None,
            annotator,
            fps,
            health: SteeringHealth::default(),
            last_outcome: FrameOutcome::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn health(&self) -> &SteeringHealth {
        &self.health
    }

    pub fn last_outcome(&self) -> FrameOutcome {
        self.last_outcome
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    pub fn overlay_config(&self) -> &OverlayConfig {
        self.annotator.config()
    }

    pub fn tracking_enabled(&self) -> bool {
        self.state.tracking_enabled
    }

    pub fn tracked_identity(&self) -> Option<&str> {
        self.state.tracked_identity()
    }

    /// Switch tracking on or off. An actual toggle drops the live track,
    /// stops a moving camera and starts debouncing over; re-sending the
    /// current value changes nothing.
    pub fn set_tracking_enabled(&mut self, enabled: bool) {
        if self.state.tracking_enabled == enabled {
            return;
        }
        debug!(camera = %self.name, enabled, "tracking toggled");
        self.halt();
        self.state.tracking_enabled = enabled;
    }

    /// Follow `identity` from the next frame on. Changing the identity drops
    /// the current track; setting the same identity again keeps it.
    pub fn set_tracked_identity(&mut self, identity: Option<String>) {
        if self.state.tracked_identity == identity {
            return;
        }
        debug!(camera = %self.name, ?identity, "tracked identity changed");
        self.halt();
        self.state.tracked_identity = identity;
    }

    /// Bind (or unbind with `None`) the camera's PTZ head. A previously bound
    /// head is stopped and disconnected first.
    pub fn set_actuator(&mut self, binding: Option<PtzBinding>) {
        self.release_actuator();
        self.actuator = binding;
    }

    pub fn has_actuator(&self) -> bool {
        self.actuator.is_some()
    }

    /// Final teardown: always stop the head, then disconnect it and forget
    /// the track.
    pub fn shutdown(&mut self) {
        debug!(camera = %self.name, "shutting down steering");
        self.release_actuator();
        self.discard_track();
    }

    /// Process one frame against the latest published snapshot.
    pub fn update_shared(&mut self, frame: Frame, snapshot: &SharedSnapshot) -> Frame {
        let snapshot: Arc<DetectionSnapshot> = snapshot.latest();
        self.update(frame, &snapshot)
    }

    /// Process one frame and return it annotated.
    pub fn update(&mut self, mut frame: Frame, snapshot: &DetectionSnapshot) -> Frame {
        let fps = self.fps.tick();

        let outcome = if self.state.is_steering() {
            self.steer(&frame, snapshot)
        } else {
            self.halt();
            FrameOutcome::default()
        };

        for detection in snapshot.detections() {
            self.annotator.draw_detection(&mut frame, detection);
        }
        if let Some(bbox) = &outcome.steering_box {
            let zone = DeadZone::for_frame(frame.width(), frame.height());
            self.annotator.draw_dead_zone(&mut frame, &zone);
            if let Some(identity) = self.state.tracked_identity() {
                self.annotator.draw_banner(&mut frame, identity);
            }
            self.annotator.draw_tracked(&mut frame, bbox);
        }
        self.annotator.draw_fps(&mut frame, fps);

        self.last_outcome = outcome;
        frame
    }

    fn steer(&mut self, frame: &Frame, snapshot: &DetectionSnapshot) -> FrameOutcome {
        let fresh = self
            .state
            .tracked_identity()
            .and_then(|identity| snapshot.find(identity))
            .map(|detection| detection.bbox);

        let raw = if let Some(bbox) = fresh {
            let mut tracker = self.prototype.clone();
            tracker.start(frame, bbox);
            self.tracker = Some(tracker);
            self.state.phase = TrackPhase::Seeded;
            trace!(camera = %self.name, ?bbox, generation = snapshot.generation(), "tracker seeded");
            bbox
        } else if let Some(tracker) = self.tracker.as_mut() {
            self.state.phase = TrackPhase::Predicting;
            tracker.advance(frame)
        } else {
            return FrameOutcome::default();
        };

        let bbox = raw.clamp_to(frame.width(), frame.height());
        if bbox.is_degenerate() {
            warn!(camera = %self.name, ?raw, "tracked box left the frame, dropping track");
            self.health.degenerate_boxes += 1;
            self.halt();
            return FrameOutcome::default();
        }
        self.state.last_box = Some(bbox);

        let zone = DeadZone::for_frame(frame.width(), frame.height());
        let classified = zone.classify(&bbox);
        let dispatched = classified.and_then(|command| self.command(command));

        FrameOutcome {
            phase: self.state.phase,
            steering_box: Some(bbox),
            classified,
            dispatched,
        }
    }

    /// Send `command` unless it repeats the last one delivered.
    fn command(&mut self, command: PtzCommand) -> Option<PtzCommand> {
        if self.state.last_command == Some(command) {
            trace!(camera = %self.name, %command, "debounced");
            return None;
        }
        let Some(binding) = self.actuator.as_mut() else {
            self.health.unbound_frames += 1;
            return None;
        };

        let result = binding.dispatch(command);
        self.health.record(&result);
        match result {
            Ok(()) => {
                debug!(camera = %self.name, %command, "ptz command sent");
                self.state.last_command = Some(command);
                Some(command)
            }
            Err(err) => {
                warn!(camera = %self.name, %command, error = %err, "ptz command failed");
                None
            }
        }
    }

    /// Drop the track and stop the camera if it was last told to move.
    ///
    /// A failed stop keeps the last move command so the next halt retries it.
    fn halt(&mut self) {
        let moving = self
            .state
            .last_command
            .filter(|command| *command != PtzCommand::Stop);
        let mut unstopped = None;
        if let (Some(command), Some(binding)) = (moving, self.actuator.as_mut()) {
            let result = binding.dispatch(PtzCommand::Stop);
            self.health.record(&result);
            if let Err(err) = result {
                warn!(camera = %self.name, error = %err, "failed to stop ptz");
                unstopped = Some(command);
            }
        }
        self.tracker = None;
        self.state.reset();
        self.state.last_command = unstopped;
    }

    fn discard_track(&mut self) {
        self.tracker = None;
        self.state.clear_track();
    }

    fn release_actuator(&mut self) {
        if let Some(mut binding) = self.actuator.take() {
            let result = binding.dispatch(PtzCommand::Stop);
            self.health.record(&result);
            if let Err(err) = result.and_then(|()| binding.disconnect()) {
                warn!(camera = %self.name, error = %err, "failed to release ptz");
            }
        }
        self.state.last_command = None;
    }
}

impl TrackingController<TemplateTracker> {
    /// Controller with a [`TemplateTracker`] and overlay as configured.
    /// The actuator is bound separately with [`set_actuator`](Self::set_actuator).
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::with_overlay(
            config.name.clone(),
            TemplateTracker::new(config.tracker.clone()),
            Annotator::new(config.overlay.clone()),
        )
    }
}

impl<T: CorrelationTracker + std::fmt::Debug> std::fmt::Debug for TrackingController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingController")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("actuator", &self.actuator)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}
