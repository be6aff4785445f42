//! RGBA pixel buffer shared by every stage of the pipeline.
//!
//! ## Layout
//!
//! A [`Bitmap`] owns an `Array3<u8>` shaped `(height, width, 4)`:
//! row-major, top-left origin, interleaved R, G, B, A. Filters read it
//! through [`Bitmap::view`] and return freshly allocated arrays, so a
//! source bitmap is never mutated by a render.

use std::path::Path;

use image::RgbaImage;
use ndarray::{Array3, ArrayView3};

use crate::error::{Error, Result};

/// Channels per pixel.
pub const CHANNELS: usize = 4;

/// Largest supported edge length in pixels.
pub const MAX_DIMENSION: usize = 16_384;

/// An 8-bit RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pixels: Array3<u8>,
}

impl Bitmap {
    /// Create a fully transparent bitmap.
    pub fn new(width: usize, height: usize) -> Self {
        Bitmap {
            pixels: Array3::<u8>::zeros((height, width, CHANNELS)),
        }
    }

    /// Create a bitmap filled with a single color.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let pixels = Array3::from_shape_fn((height, width, CHANNELS), |(_, _, c)| rgba[c]);
        Bitmap { pixels }
    }

    /// Wrap a flat RGBA buffer (length = width * height * 4).
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| Error::InvalidBuffer(format!("{width}x{height} overflows")))?;
        if data.len() != expected {
            return Err(Error::InvalidBuffer(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                data.len()
            )));
        }
        let pixels = Array3::from_shape_vec((height, width, CHANNELS), data)
            .map_err(|e| Error::InvalidBuffer(e.to_string()))?;
        Ok(Bitmap { pixels })
    }

    /// Wrap an existing `(height, width, 4)` array.
    pub fn from_array(pixels: Array3<u8>) -> Result<Self> {
        let channels = pixels.dim().2;
        if channels != CHANNELS {
            return Err(Error::InvalidBuffer(format!(
                "expected {CHANNELS} channels, got {channels}"
            )));
        }
        Ok(Bitmap { pixels })
    }

    /// Decode an encoded image (PNG, JPEG, WebP, GIF, BMP).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(Error::Decode)?;
        Ok(Self::from_image(decoded.to_rgba8()))
    }

    /// Decode an image file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes)
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let pixels = Array3::from_shape_vec((height, width, CHANNELS), image.into_raw())
            .unwrap_or_else(|_| Array3::zeros((height, width, CHANNELS)));
        Bitmap { pixels }
    }

    /// Copy into an `image::RgbaImage` for encoding.
    pub fn to_image(&self) -> RgbaImage {
        let (width, height) = (self.width() as u32, self.height() as u32);
        let raw: Vec<u8> = self.pixels.iter().copied().collect();
        RgbaImage::from_raw(width, height, raw).unwrap_or_else(|| RgbaImage::new(width, height))
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    pub fn pixels(&self) -> &Array3<u8> {
        &self.pixels
    }

    pub fn into_array(self) -> Array3<u8> {
        self.pixels
    }

    /// Flat RGBA bytes in row-major order.
    pub fn into_raw(self) -> Vec<u8> {
        if self.pixels.is_standard_layout() {
            self.pixels.into_raw_vec_and_offset().0
        } else {
            self.pixels.iter().copied().collect()
        }
    }

    /// Read one pixel. Panics when out of bounds, like ndarray indexing.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        [
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
            self.pixels[[y, x, 3]],
        ]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        for (c, v) in rgba.into_iter().enumerate() {
            self.pixels[[y, x, c]] = v;
        }
    }
}
