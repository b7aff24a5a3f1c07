//! PTZ actuator capability and the per-camera binding that routes commands
//! to the right style of call.

use serde::{Deserialize, Serialize};

use crate::steering::{Direction, PtzCommand};

/// Failure reported by a PTZ transport.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActuatorError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("operation not supported by this PTZ head")]
    Unsupported,
    #[error("PTZ head is disconnected")]
    Disconnected,
}

/// Pan/tilt head driver. A camera uses either the continuous-speed or the
/// discrete-move style, never both; see [`ActuatorKind`].
///
/// Calls must not block for long: they run on the render thread.
pub trait PtzActuator: Send {
    /// Drive at the given speeds until told otherwise.
    fn move_continuous(&mut self, pan_speed: f32, tilt_speed: f32) -> Result<(), ActuatorError>;

    /// Start travelling in `direction` until told otherwise.
    fn move_discrete(&mut self, direction: Direction) -> Result<(), ActuatorError>;

    fn stop(&mut self) -> Result<(), ActuatorError>;

    /// Release the underlying connection. Called once, after a final stop.
    fn disconnect(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }
}

/// Which style of call a camera's PTZ head understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Network heads driven by pan/tilt speed pairs.
    Continuous,
    /// USB heads driven by per-direction move calls.
    Discrete,
}

/// A camera's actuator together with its binding style.
pub struct PtzBinding {
    kind: ActuatorKind,
    actuator: Box<dyn PtzActuator>,
}

impl PtzBinding {
    pub fn new(kind: ActuatorKind, actuator: impl PtzActuator + 'static) -> Self {
        Self {
            kind,
            actuator: Box::new(actuator),
        }
    }

    pub fn continuous(actuator: impl PtzActuator + 'static) -> Self {
        Self::new(ActuatorKind::Continuous, actuator)
    }

    pub fn discrete(actuator: impl PtzActuator + 'static) -> Self {
        Self::new(ActuatorKind::Discrete, actuator)
    }

    pub fn kind(&self) -> ActuatorKind {
        self.kind
    }

    /// Translate `command` into the call this binding's head expects.
    ///
    /// Continuous heads stop by being given zero speeds.
    pub fn dispatch(&mut self, command: PtzCommand) -> Result<(), ActuatorError> {
        match (self.kind, command.direction()) {
            (ActuatorKind::Continuous, _) => {
                let (pan, tilt) = command.speeds();
                self.actuator.move_continuous(pan, tilt)
            }
            (ActuatorKind::Discrete, Some(direction)) => self.actuator.move_discrete(direction),
            (ActuatorKind::Discrete, None) => self.actuator.stop(),
        }
    }

    pub fn disconnect(&mut self) -> Result<(), ActuatorError> {
        self.actuator.disconnect()
    }
}

impl std::fmt::Debug for PtzBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtzBinding")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Running account of steering problems for one camera.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SteeringHealth {
    /// Commands the actuator accepted.
    pub dispatched: u64,
    /// Commands the actuator rejected.
    pub failures: u64,
    pub last_error: Option<ActuatorError>,
    /// Tracked boxes that collapsed once clipped to the frame.
    pub degenerate_boxes: u64,
    /// Frames steered while no actuator was bound.
    pub unbound_frames: u64,
}

impl SteeringHealth {
    /// No actuator failure since the last successful dispatch.
    pub fn is_healthy(&self) -> bool {
        self.last_error.is_none()
    }

    pub(crate) fn record(&mut self, result: &Result<(), ActuatorError>) {
        match result {
            Ok(()) => {
                self.dispatched += 1;
                self.last_error = None;
            }
            Err(err) => {
                self.failures += 1;
                self.last_error = Some(err.clone());
            }
        }
    }
}
