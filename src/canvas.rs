//! Working raster for one coloring page.
//!
//! A [`PixelBuffer`] is a plain width×height RGBA byte raster with
//! bounds-checked accessors. It is loaded once from the decoded background
//! art when a session opens, mutated only by the flood fill, and replaced
//! wholesale on `clear()`. One buffer per active session — there is no
//! sharing and no interior mutability.

use image::{Rgba, RgbaImage};

/// Maximum edge length accepted for a working buffer. Book pages top out
/// around 4K; anything larger is almost certainly a bad host request.
pub const MAX_EDGE: u32 = 8192;

/// Flat RGBA raster addressed as `(y * width + x) * 4`.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer. Dimensions are clamped to
    /// `1..=MAX_EDGE` so index arithmetic can never overflow.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.clamp(1, MAX_EDGE);
        let height = height.clamp(1, MAX_EDGE);
        Self {
            width,
            height,
            pixels: vec![0u8; (width * height * 4) as usize],
        }
    }

    /// Build a buffer from a decoded image, copying its pixel data.
    /// The caller must have awaited decode completion; a decoded
    /// `RgbaImage` is the readiness token in this engine.
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.as_raw().clone(),
        }
    }

    /// Convert back into an owned `RgbaImage` for resampling or encoding.
    pub fn to_image(&self) -> RgbaImage {
        // Length invariant holds by construction, so from_raw cannot fail.
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the raw RGBA bytes (length = width * height * 4).
    pub fn raw(&self) -> &[u8] {
        &self.pixels
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Read one pixel. Out-of-range coordinates return `None` — they are
    /// rejected, never wrapped.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some(Rgba([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]))
    }

    /// Write one pixel. The only per-pixel mutator; out-of-range
    /// coordinates are a silent no-op so pointer jitter at the canvas edge
    /// can never corrupt adjacent rows.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels[i..i + 4].copy_from_slice(&color.0);
    }

    /// Swap in a fully mutated raster in one write. Used by the flood fill
    /// to commit its scratch copy once the operation finishes, instead of
    /// synchronizing the buffer pixel by pixel mid-fill.
    ///
    /// Rasters of the wrong length are rejected unchanged.
    pub fn replace_raw(&mut self, pixels: Vec<u8>) {
        if pixels.len() == self.pixels.len() {
            self.pixels = pixels;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip() {
        let mut buf = PixelBuffer::new(4, 3);
        buf.set(2, 1, Rgba([10, 20, 30, 255]));
        assert_eq!(buf.get(2, 1), Some(Rgba([10, 20, 30, 255])));
        assert_eq!(buf.get(0, 0), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn out_of_bounds_rejected_not_wrapped() {
        let mut buf = PixelBuffer::new(4, 3);
        assert_eq!(buf.get(4, 0), None);
        assert_eq!(buf.get(0, 3), None);
        // A wrapped write would land at (0, 1); it must not.
        buf.set(4, 0, Rgba([255, 0, 0, 255]));
        assert_eq!(buf.get(0, 1), Some(Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn from_image_preserves_pixels() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 0, Rgba([9, 8, 7, 255]));
        let buf = PixelBuffer::from_image(&img);
        assert_eq!(buf.get(1, 0), Some(Rgba([9, 8, 7, 255])));
        assert_eq!(buf.to_image(), img);
    }

    #[test]
    fn replace_raw_rejects_wrong_length() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(0, 0, Rgba([1, 2, 3, 4]));
        buf.replace_raw(vec![0u8; 7]);
        assert_eq!(buf.get(0, 0), Some(Rgba([1, 2, 3, 4])));
        buf.replace_raw(vec![255u8; 16]);
        assert_eq!(buf.get(1, 1), Some(Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn degenerate_dimensions_clamped() {
        let buf = PixelBuffer::new(0, 0);
        assert_eq!((buf.width(), buf.height()), (1, 1));
    }
}
