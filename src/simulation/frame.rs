//! Pixel buffer produced by the rasterizer.

use super::Rgb;

/// A rendered frame: row-major RGBA, four bytes per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Raw RGBA bytes.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
}

impl PixelBuffer {
    /// Creates an opaque buffer filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Wraps existing RGBA bytes.
    ///
    /// The caller is responsible for the length matching the dimensions;
    /// see [`PixelBuffer::is_valid`].
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Returns the raw RGBA bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the buffer, returning the RGBA bytes.
    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the byte count matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count() * 4
    }

    /// Returns the RGB components at `(x, y)`, or `None` outside the frame.
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        self.pixels
            .get(i..i + 3)
            .map(|px| [px[0], px[1], px[2]])
    }

    /// Composites `color` over the pixel at `(x, y)` with source-over
    /// blending. Out-of-frame coordinates are ignored.
    pub(crate) fn blend(&mut self, x: u32, y: u32, color: Rgb, alpha: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let i = self.offset(x, y);
        let Some(px) = self.pixels.get_mut(i..i + 4) else {
            return;
        };
        for (dst, src) in px.iter_mut().zip([color.r, color.g, color.b]) {
            let mixed = f32::from(src) * a + f32::from(*dst) * (1.0 - a);
            *dst = mixed.round().clamp(0.0, 255.0) as u8;
        }
        px[3] = 0xff;
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_buffer() {
        let buf = PixelBuffer::filled(4, 3, Rgb::new(1, 2, 3));

        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 3);
        assert!(buf.is_valid());
        assert_eq!(buf.rgb_at(3, 2), Some([1, 2, 3]));
        assert_eq!(buf.pixels()[3], 0xff);
    }

    #[test]
    fn test_rgb_at_out_of_bounds() {
        let buf = PixelBuffer::filled(2, 2, Rgb::new(0, 0, 0));
        assert_eq!(buf.rgb_at(2, 0), None);
        assert_eq!(buf.rgb_at(0, 2), None);
    }

    #[test]
    fn test_invalid_size() {
        let buf = PixelBuffer::from_rgba(vec![0u8; 10], 2, 2);
        assert!(!buf.is_valid());
    }

    #[test]
    fn test_blend_half_alpha() {
        let mut buf = PixelBuffer::filled(1, 1, Rgb::new(0, 0, 0));
        buf.blend(0, 0, Rgb::new(200, 100, 50), 0.5);
        assert_eq!(buf.rgb_at(0, 0), Some([100, 50, 25]));
    }

    #[test]
    fn test_blend_outside_is_ignored() {
        let mut buf = PixelBuffer::filled(1, 1, Rgb::new(9, 9, 9));
        buf.blend(5, 5, Rgb::new(255, 255, 255), 1.0);
        assert_eq!(buf.rgb_at(0, 0), Some([9, 9, 9]));
    }
}
