//! Dead-zone steering: turning a tracked box into debounced PTZ commands.

mod actuator;
mod command;
mod dead_zone;

pub use actuator::{ActuatorError, ActuatorKind, PtzActuator, PtzBinding, SteeringHealth};
pub use command::{Direction, PtzCommand, STEER_SPEED};
pub use dead_zone::{DeadZone, ZoneRule};
