//! Per-camera configuration.
//!
//! Every struct has a `Default` and deserializes with missing fields filled
//! from it, so a JSON document only needs the keys it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::steering::ActuatorKind;

/// Worker and queue settings for one camera pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Captured frames buffered for the render thread before new ones are dropped.
    pub render_queue: usize,
    /// Frames buffered for the recognizer; it only ever needs the newest.
    pub recognition_queue: usize,
    /// How often idle workers re-check the stop flag.
    pub poll_interval_ms: u64,
    /// How long `stop` waits for each worker before detaching it.
    pub stop_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render_queue: 2,
            recognition_queue: 1,
            poll_interval_ms: 20,
            stop_timeout_ms: 2000,
        }
    }
}

impl PipelineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

/// Tuning for [`TemplateTracker`](crate::TemplateTracker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateTrackerConfig {
    /// Longest template side in samples; larger faces are sampled with a stride.
    pub max_template_side: u32,
    /// Search half-width around the predicted position, in pixels.
    pub search_radius: u32,
    /// Pixel step between candidate offsets.
    pub search_step: u32,
    /// Template adaptation rate per matched frame, `0.0` keeps the seed template.
    pub learning_rate: f32,
}

impl Default for TemplateTrackerConfig {
    fn default() -> Self {
        Self {
            max_template_side: 32,
            search_radius: 24,
            search_step: 2,
            learning_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// FPS counter averaging window.
    pub fps_window_secs: f32,
    pub draw_dead_zone: bool,
    /// Draw names, confidences and captions (requires a font).
    pub draw_labels: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fps_window_secs: 2.0,
            draw_dead_zone: true,
            draw_labels: true,
        }
    }
}

impl OverlayConfig {
    pub fn fps_window(&self) -> Duration {
        Duration::from_secs_f32(self.fps_window_secs.max(0.0))
    }
}

/// Everything needed to bring up one camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub name: String,
    /// Binding style of the camera's PTZ head, `None` for a fixed camera.
    pub actuator: Option<ActuatorKind>,
    pub pipeline: PipelineConfig,
    pub tracker: TemplateTrackerConfig,
    pub overlay: OverlayConfig,
}

impl CameraConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
