//! Traits for capture and face recognition backends.

use crate::detection::DetectionSnapshot;
use crate::frame::Frame;

/// Blocking source of frames, e.g. an RTSP decoder or a USB capture device.
///
/// # Example
///
/// ```ignore
/// use ptz_autotrack::{Frame, FrameSource};
///
/// struct Replay(std::vec::IntoIter<Frame>);
///
/// impl FrameSource for Replay {
///     type Error = std::convert::Infallible;
///
///     fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
///         Ok(self.0.next())
///     }
/// }
/// ```
pub trait FrameSource {
    type Error: std::fmt::Display;

    /// Block until the next frame is available. `Ok(None)` ends the stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

/// Face detection plus identification over a whole frame.
///
/// Runs on its own thread and may be slow; the render thread only ever sees
/// its latest committed result.
pub trait FaceRecognizer {
    type Error: std::fmt::Display;

    /// Every face found in `frame`, each labelled with an identity.
    fn recognize(&mut self, frame: &Frame) -> Result<DetectionSnapshot, Self::Error>;
}
