//! Plumbing between a camera's capture device, its face recognizer and the
//! render thread that drives the [`TrackingController`](crate::TrackingController).
//!
//! Capture and recognition backends plug in through [`FrameSource`] and
//! [`FaceRecognizer`]; [`CameraPipeline`] runs them on worker threads.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{FaceRecognizer, FrameSource};
pub use pipeline::CameraPipeline;
