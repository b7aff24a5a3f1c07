//! Trait for frame-to-frame visual trackers.

use crate::frame::Frame;
use crate::tracker::BoundingBox;

/// A visual tracker that follows a region from frame to frame without any
/// notion of identity.
///
/// The controller clones a configured prototype every time it (re)seeds, so a
/// fresh instance never carries drift from a previous track.
///
/// # Example
///
/// ```ignore
/// use ptz_autotrack::{BoundingBox, CorrelationTracker, Frame};
///
/// #[derive(Clone)]
/// struct Stationary(BoundingBox);
///
/// impl CorrelationTracker for Stationary {
///     fn start(&mut self, _frame: &Frame, bbox: BoundingBox) {
///         self.0 = bbox;
///     }
///
///     fn advance(&mut self, _frame: &Frame) -> BoundingBox {
///         self.0
///     }
/// }
/// ```
pub trait CorrelationTracker: Clone + Send {
    /// Begin tracking `bbox` in `frame`.
    fn start(&mut self, frame: &Frame, bbox: BoundingBox);

    /// Advance against the next frame and return the predicted box.
    ///
    /// Whatever the tracker returns is used as-is; a collapsed or
    /// out-of-frame box is handled by the caller.
    fn advance(&mut self, frame: &Frame) -> BoundingBox;
}
