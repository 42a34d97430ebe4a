//! Owned 8-bit RGB pixel storage.

use image::RgbImage;

use crate::color::Rgb8;

/// A rendered image: `width * height` pixels in row-major order, top row
/// first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    pixels: Vec<Rgb8>,
    width: u32,
    height: u32,
}

impl PixelGrid {
    /// Create a black grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![Rgb8::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wrap existing pixels. Returns `None` if the length doesn't match the
    /// dimensions.
    pub fn from_pixels(pixels: Vec<Rgb8>, width: u32, height: u32) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb8] {
        &self.pixels
    }

    /// Set the pixel at (x, y). Silently ignores out-of-bounds coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgb8) {
        if x < self.width && y < self.height {
            let idx = y as usize * self.width as usize + x as usize;
            self.pixels[idx] = pixel;
        }
    }

    /// Get the pixel at (x, y), or None if out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Packed `RGBRGB...` bytes, as written to a binary pixmap.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b])
            .collect()
    }

    /// Rebuild a grid from packed `RGBRGB...` bytes.
    pub fn from_bytes(bytes: &[u8], width: u32, height: u32) -> Option<Self> {
        if bytes.len() != width as usize * height as usize * 3 {
            return None;
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|c| Rgb8::new(c[0], c[1], c[2]))
            .collect();
        Self::from_pixels(pixels, width, height)
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let p = self.pixels[y as usize * self.width as usize + x as usize];
            image::Rgb([p.r, p.g, p.b])
        })
    }

    pub fn from_image(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|p| Rgb8::new(p[0], p[1], p[2]))
            .collect();
        Self {
            pixels,
            width: image.width(),
            height: image.height(),
        }
    }
}
