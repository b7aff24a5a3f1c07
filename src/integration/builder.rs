//! Builder for [`FaceDetection`]s from the box layouts recognizers emit.

use crate::detection::FaceDetection;
use crate::tracker::BoundingBox;

/// Builds a [`FaceDetection`] from whichever box layout a recognizer emits.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: BoundingBox,
    label: String,
    confidence: String,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box as (left, top, right, bottom).
    pub fn ltrb(mut self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        self.bbox = BoundingBox::from_ltrb(left, top, right, bottom);
        self
    }

    /// Box as (left, top, width, height).
    pub fn ltwh(mut self, left: f32, top: f32, width: f32, height: f32) -> Self {
        self.bbox = BoundingBox::from_ltwh(left, top, width, height);
        self
    }

    /// Box in face-recognition order: (top, right, bottom, left).
    pub fn trbl(mut self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        self.bbox = BoundingBox::new(top, right, bottom, left);
        self
    }

    /// Box scaled up from a downsampled recognition frame.
    pub fn scaled(mut self, factor: f32) -> Self {
        let b = self.bbox;
        self.bbox = BoundingBox::new(b.top * factor, b.right * factor, b.bottom * factor, b.left * factor);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Confidence in `[0, 1]`, rendered as a whole percentage.
    pub fn score(mut self, score: f32) -> Self {
        self.confidence = format!("{:.0}%", (score * 100.0).clamp(0.0, 100.0));
        self
    }

    pub fn confidence(mut self, confidence: impl Into<String>) -> Self {
        self.confidence = confidence.into();
        self
    }

    pub fn build(self) -> FaceDetection {
        FaceDetection::new(self.bbox, self.label, self.confidence)
    }
}
