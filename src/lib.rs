//! Face-recognition driven PTZ auto-tracking.
//!
//! Each camera runs a capture worker and a recognition worker. The caller's
//! render thread feeds every captured frame through a [`TrackingController`],
//! which fuses the latest published [`DetectionSnapshot`] with a
//! [`CorrelationTracker`] and steers the camera's [`PtzActuator`].

pub mod config;
pub mod controller;
pub mod detection;
pub mod error;
pub mod frame;
pub mod integration;
pub mod overlay;
pub mod registry;
pub mod steering;
pub mod tracker;

pub use config::{CameraConfig, OverlayConfig, PipelineConfig, TemplateTrackerConfig};
pub use controller::{FrameOutcome, TrackingController};
pub use detection::{DetectionSnapshot, FaceDetection, SharedSnapshot};
pub use error::{Error, Result};
pub use frame::Frame;
pub use integration::{CameraPipeline, DetectionBuilder, FaceRecognizer, FrameSource};
pub use overlay::{Annotator, FpsCounter};
pub use registry::{CameraId, CameraRegistry};
pub use steering::{
    ActuatorError, ActuatorKind, DeadZone, Direction, PtzActuator, PtzBinding, PtzCommand,
    SteeringHealth,
};
pub use tracker::{BoundingBox, CorrelationTracker, TemplateTracker, TrackPhase, TrackState};
