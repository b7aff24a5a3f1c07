use crate::steering::PtzCommand;
use crate::tracker::BoundingBox;

/// Phase of the per-camera reseed/predict state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackPhase {
    /// No live tracker
    #[default]
    Idle,
    /// Tracker (re)initialized this frame from a fresh detection
    Seeded,
    /// Tracker advanced by correlation only
    Predicting,
}

/// Per-camera tracking record.
///
/// `last_box` is `Some` exactly when the phase is not [`TrackPhase::Idle`];
/// the controller keeps its tracker instance in step with that.
#[derive(Debug, Clone, Default)]
pub struct TrackState {
    pub(crate) tracked_identity: Option<String>,
    pub(crate) tracking_enabled: bool,
    pub(crate) phase: TrackPhase,
    pub(crate) last_box: Option<BoundingBox>,
    pub(crate) last_command: Option<PtzCommand>,
}

impl TrackState {
    pub fn tracked_identity(&self) -> Option<&str> {
        self.tracked_identity.as_deref()
    }

    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    /// Whether a live tracker has been seeded.
    pub fn track_active(&self) -> bool {
        self.phase != TrackPhase::Idle
    }

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    /// Last known or predicted box of the tracked identity.
    pub fn last_box(&self) -> Option<BoundingBox> {
        self.last_box
    }

    /// Last command actually delivered to the actuator.
    pub fn last_command(&self) -> Option<PtzCommand> {
        self.last_command
    }

    /// Tracking is switched on and there is someone to follow.
    pub fn is_steering(&self) -> bool {
        self.tracking_enabled && self.tracked_identity.is_some()
    }

    /// Drop the live track; the caller discards its tracker instance.
    pub(crate) fn clear_track(&mut self) {
        self.phase = TrackPhase::Idle;
        self.last_box = None;
    }

    pub(crate) fn reset(&mut self) {
        self.clear_track();
        self.last_command = None;
    }
}
