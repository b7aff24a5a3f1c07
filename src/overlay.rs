//! On-frame annotations: detection boxes, the dead zone, the tracked box and
//! the FPS counter.

use std::time::{Duration, Instant};

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::config::OverlayConfig;
use crate::detection::FaceDetection;
use crate::error::Result;
use crate::frame::Frame;
use crate::steering::DeadZone;
use crate::tracker::BoundingBox;

const DETECTION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const NAME_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const CONFIDENCE_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
const DEAD_ZONE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const TRACKED_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const STATUS_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Rolling frames-per-second estimate, refreshed once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    started: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(window: Duration) -> Self {
        Self::starting_at(window, Instant::now())
    }

    pub fn starting_at(window: Duration, started: Instant) -> Self {
        Self {
            window,
            started,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count a frame rendered now.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Count a frame rendered at `now`; the estimate only changes when a
    /// full window has elapsed.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.window && !elapsed.is_zero() {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.started = now;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(OverlayConfig::default().fps_window())
    }
}

/// Draws tracking overlays onto frames.
///
/// Text needs a font supplied by the application; without one only
/// rectangles are drawn.
#[derive(Clone, Default)]
pub struct Annotator {
    config: OverlayConfig,
    font: Option<FontArc>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("config", &self.config)
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config, font: None }
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Load a TrueType/OpenType font for labels.
    pub fn with_font_bytes(self, bytes: Vec<u8>) -> Result<Self> {
        Ok(self.with_font(FontArc::try_from_vec(bytes)?))
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Box with the name above its top-left corner and the confidence inside
    /// its bottom-right corner.
    pub fn draw_detection(&self, frame: &mut Frame, detection: &FaceDetection) {
        let b = detection.bbox;
        let image = frame.image_mut();
        draw_box(image, &b, DETECTION_COLOR, 2);
        self.text(image, &detection.label, b.left + 5.0, b.top - 18.0, 14.0, NAME_COLOR);
        self.text(
            image,
            &detection.confidence,
            b.right - 52.0,
            b.bottom - 18.0,
            13.0,
            CONFIDENCE_COLOR,
        );
    }

    pub fn draw_dead_zone(&self, frame: &mut Frame, zone: &DeadZone) {
        if !self.config.draw_dead_zone {
            return;
        }
        let b = BoundingBox::from_ltrb(zone.min_x, zone.min_y, zone.max_x, zone.max_y);
        draw_box(frame.image_mut(), &b, DEAD_ZONE_COLOR, 2);
    }

    /// The box currently steering the camera, captioned "tracking".
    pub fn draw_tracked(&self, frame: &mut Frame, bbox: &BoundingBox) {
        let image = frame.image_mut();
        draw_box(image, bbox, TRACKED_COLOR, 3);
        self.text(image, "tracking", bbox.left, bbox.bottom + 4.0, 13.0, DETECTION_COLOR);
    }

    /// "TRACKING <NAME>" banner in the top-left corner.
    pub fn draw_banner(&self, frame: &mut Frame, identity: &str) {
        let banner = format!("TRACKING {}", identity.to_uppercase());
        self.text(frame.image_mut(), &banner, 20.0, 40.0, 20.0, STATUS_COLOR);
    }

    pub fn draw_fps(&self, frame: &mut Frame, fps: f32) {
        let label = format!("FPS: {fps:.2}");
        self.text(frame.image_mut(), &label, 20.0, 14.0, 20.0, STATUS_COLOR);
    }

    fn text(&self, image: &mut RgbImage, text: &str, x: f32, y: f32, size: f32, color: Rgb<u8>) {
        if !self.config.draw_labels {
            return;
        }
        let Some(font) = &self.font else {
            return;
        };
        draw_text_mut(
            image,
            color,
            x as i32,
            y as i32,
            PxScale::from(size),
            font,
            text,
        );
    }
}

/// Hollow rectangle `thickness` pixels wide, growing outward from `bbox`.
/// Degenerate boxes are skipped; drawing is clipped to the image.
fn draw_box(image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    if bbox.is_degenerate() {
        return;
    }
    let (left, top) = (bbox.left.round() as i32, bbox.top.round() as i32);
    let width = bbox.width().round().max(1.0) as u32;
    let height = bbox.height().round().max(1.0) as u32;
    for i in 0..thickness {
        let rect = Rect::at(left - i as i32, top - i as i32).of_size(width + 2 * i, height + 2 * i);
        draw_hollow_rect_mut(image, rect, color);
    }
}
