//! Crate-wide error type.

use std::time::Duration;

use crate::steering::ActuatorError;

/// Errors surfaced by the tracking core and its camera workers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The three parallel detection sequences disagree in length.
    #[error(
        "detection snapshot is misaligned: {boxes} boxes, {labels} labels, {confidences} confidences"
    )]
    SnapshotMismatch {
        boxes: usize,
        labels: usize,
        confidences: usize,
    },

    #[error("actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    /// A worker did not observe the stop flag in time and was detached.
    #[error("{worker} worker did not stop within {timeout:?}")]
    ThreadStopTimeout {
        worker: &'static str,
        timeout: Duration,
    },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid overlay font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}

pub type Result<T> = std::result::Result<T, Error>;
