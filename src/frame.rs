use image::RgbImage;

/// A captured RGB frame with its arrival order on the owning camera.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
    sequence: u64,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image, sequence: 0 }
    }

    /// Blank (black) frame of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(RgbImage::new(width, height))
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}
