//! Template-matching correlation tracker.
//!
//! On `start` the tracker samples a grayscale template of the face. Each
//! `advance` predicts where the face moved with a constant-velocity Kalman
//! filter, then scores every candidate offset in a square window around that
//! prediction by normalized cross-correlation (NCC). The best offset becomes
//! the new box and is folded back into both the motion model and, slowly, the
//! template.

use ndarray::Array2;
use tracing::trace;

use crate::config::TemplateTrackerConfig;
use crate::frame::Frame;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::{BoundingBox, CorrelationTracker};

/// Templates smaller than this (in pixels, per side) are not tracked.
const MIN_TEMPLATE_SIDE: f32 = 2.0;

#[derive(Debug, Clone)]
struct Template {
    pixels: Array2<f32>,
    /// Pixel stride used when sampling both the template and candidates.
    stride: usize,
}

#[derive(Debug, Clone)]
struct Track {
    template: Template,
    motion: KalmanFilter,
    bbox: BoundingBox,
    score: f32,
}

/// NCC template tracker with a Kalman-predicted search window.
#[derive(Debug, Clone)]
pub struct TemplateTracker {
    config: TemplateTrackerConfig,
    track: Option<Track>,
    /// Box returned when no template could be taken.
    fallback: BoundingBox,
}

impl TemplateTracker {
    pub fn new(config: TemplateTrackerConfig) -> Self {
        Self {
            config,
            track: None,
            fallback: BoundingBox::default(),
        }
    }

    /// NCC score of the most recent match, in `[-1, 1]`.
    pub fn last_score(&self) -> Option<f32> {
        self.track.as_ref().map(|t| t.score)
    }
}

impl Default for TemplateTracker {
    fn default() -> Self {
        Self::new(TemplateTrackerConfig::default())
    }
}

impl CorrelationTracker for TemplateTracker {
    fn start(&mut self, frame: &Frame, bbox: BoundingBox) {
        self.fallback = bbox;
        self.track = None;

        let clipped = bbox.clamp_to(frame.width(), frame.height());
        if clipped.width() < MIN_TEMPLATE_SIDE || clipped.height() < MIN_TEMPLATE_SIDE {
            trace!(?bbox, "box too small to sample a template");
            return;
        }

        let gray = luma(frame);
        let side = clipped.width().max(clipped.height());
        let stride = (side / self.config.max_template_side.max(1) as f32).ceil() as usize;
        let stride = stride.max(1);
        let rows = (clipped.height() as usize / stride).max(1);
        let cols = (clipped.width() as usize / stride).max(1);

        let Some(pixels) = sample(
            &gray,
            clipped.left as isize,
            clipped.top as isize,
            rows,
            cols,
            stride,
        ) else {
            return;
        };

        self.track = Some(Track {
            template: Template { pixels, stride },
            motion: KalmanFilter::initiate(&clipped),
            bbox: clipped,
            score: 1.0,
        });
    }

    fn advance(&mut self, frame: &Frame) -> BoundingBox {
        let Some(track) = self.track.as_mut() else {
            return self.fallback;
        };

        track.motion.predict();
        let (cx, cy) = track.motion.center();
        let predicted = BoundingBox::from_center(cx, cy, track.bbox.width(), track.bbox.height());

        let gray = luma(frame);
        let (rows, cols) = track.template.pixels.dim();
        let stride = track.template.stride;
        let radius = self.config.search_radius as isize;
        let step = self.config.search_step.max(1) as usize;
        let origin_x = predicted.left.round() as isize;
        let origin_y = predicted.top.round() as isize;

        let mut best: Option<(f32, isize, isize, Array2<f32>)> = None;
        for dy in (-radius..=radius).step_by(step) {
            for dx in (-radius..=radius).step_by(step) {
                let (left, top) = (origin_x + dx, origin_y + dy);
                let Some(patch) = sample(&gray, left, top, rows, cols, stride) else {
                    continue;
                };
                let score = ncc(&track.template.pixels, &patch);
                if best.as_ref().is_none_or(|(s, ..)| score > *s) {
                    best = Some((score, left, top, patch));
                }
            }
        }

        match best {
            Some((score, left, top, patch)) => {
                let found = BoundingBox::from_ltwh(
                    left as f32,
                    top as f32,
                    track.bbox.width(),
                    track.bbox.height(),
                );
                track.motion.correct(&found);
                let rate = self.config.learning_rate.clamp(0.0, 1.0);
                if rate > 0.0 {
                    track.template.pixels =
                        &track.template.pixels * (1.0 - rate) + &(patch * rate);
                }
                track.bbox = found;
                track.score = score;
            }
            None => {
                // Whole window fell off the frame: coast on the motion model.
                track.bbox = predicted;
                track.score = 0.0;
            }
        }

        trace!(bbox = ?track.bbox, score = track.score, "template tracker advanced");
        track.bbox
    }
}

/// Rec.601 luma plane, indexed `[row, col]`.
fn luma(frame: &Frame) -> Array2<f32> {
    let image = frame.image();
    Array2::from_shape_fn(
        (image.height() as usize, image.width() as usize),
        |(y, x)| {
            let p = image.get_pixel(x as u32, y as u32).0;
            0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32
        },
    )
}

/// Sample a `rows x cols` grid every `stride` pixels starting at
/// `(left, top)`; `None` if any sample falls outside the plane.
fn sample(
    gray: &Array2<f32>,
    left: isize,
    top: isize,
    rows: usize,
    cols: usize,
    stride: usize,
) -> Option<Array2<f32>> {
    let (height, width) = gray.dim();
    if left < 0 || top < 0 {
        return None;
    }
    let (left, top) = (left as usize, top as usize);
    if top + (rows - 1) * stride >= height || left + (cols - 1) * stride >= width {
        return None;
    }
    Some(Array2::from_shape_fn((rows, cols), |(i, j)| {
        gray[[top + i * stride, left + j * stride]]
    }))
}

/// Zero-mean normalized cross-correlation of two equally shaped patches.
fn ncc(a: &Array2<f32>, b: &Array2<f32>) -> f32 {
    let (Some(mean_a), Some(mean_b)) = (a.mean(), b.mean()) else {
        return 0.0;
    };
    let da = a - mean_a;
    let db = b - mean_b;
    let denom = ((&da * &da).sum() * (&db * &db).sum()).sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (&da * &db).sum() / denom
}
