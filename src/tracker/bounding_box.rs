/// Face bounding box in frame pixel coordinates.
///
/// Stored in the recognizer's native `(top, right, bottom, left)` order. The
/// right and bottom edges are absolute coordinates, not extents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl BoundingBox {
    /// Create a box from `(top, right, bottom, left)` edges.
    #[inline]
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create a box from LTRB edges (x1, y1, x2, y2).
    #[inline]
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(top, right, bottom, left)
    }

    /// Create a box from its top-left corner and size.
    #[inline]
    pub fn from_ltwh(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(top, left + width, top + height, left)
    }

    /// Create a box of the given size centred on `(cx, cy)`.
    #[inline]
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::from_ltwh(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Get the center point of the box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Convert to XYAH format: (center_x, center_y, aspect_ratio, height).
    pub fn to_xyah(&self) -> [f32; 4] {
        let (cx, cy) = self.center();
        let height = self.height();
        let aspect_ratio = if height > 0.0 {
            self.width() / height
        } else {
            0.0
        };
        [cx, cy, aspect_ratio, height]
    }

    /// A box collapsed to zero (or negative) width or height.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Clip every edge into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            top: self.top.clamp(0.0, h),
            right: self.right.clamp(0.0, w),
            bottom: self.bottom.clamp(0.0, h),
            left: self.left.clamp(0.0, w),
        }
    }
}
