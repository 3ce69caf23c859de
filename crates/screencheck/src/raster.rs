//! In-memory raster images with shared pixel storage

use std::fmt;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{ScreenshotError, ScreenshotResult};
use crate::region::CropRect;

/// Screen density bucket in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Density(pub u32);

impl Density {
    /// Baseline density used when a reference carries no density of its own
    pub const BASELINE: Density = Density(160);
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}dpi", self.0)
    }
}

/// A decoded bitmap: dimensions, density and one ARGB `u32` per pixel.
///
/// The pixel buffer is reference counted. Cropping produces a view onto the
/// same buffer (an offset and a row stride), so a crop never copies pixels and
/// an uncropped image is the same allocation as its source.
#[derive(Debug, Clone)]
pub struct RasterImage {
    width: u32,
    height: u32,
    density: Density,
    pixels: Arc<[u32]>,
    offset: usize,
    stride: usize,
}

impl RasterImage {
    /// Wrap a row-major ARGB buffer. The buffer must hold exactly `width * height` values.
    pub fn new(width: u32, height: u32, density: Density, pixels: Vec<u32>) -> ScreenshotResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ScreenshotError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            density,
            pixels: pixels.into(),
            offset: 0,
            stride: width as usize,
        })
    }

    /// An image where every pixel has the same colour
    pub fn filled(width: u32, height: u32, density: Density, argb: u32) -> Self {
        Self {
            width,
            height,
            density,
            pixels: vec![argb; width as usize * height as usize].into(),
            offset: 0,
            stride: width as usize,
        }
    }

    /// Convert a decoded RGBA image, packing channels as `0xAARRGGBB`.
    pub fn from_rgba(image: &RgbaImage, density: Density) -> Self {
        let pixels: Vec<u32> = image.pixels().map(|p| pack_argb(*p)).collect();
        let (width, height) = image.dimensions();

        Self {
            width,
            height,
            density,
            pixels: pixels.into(),
            offset: 0,
            stride: width as usize,
        }
    }

    pub fn to_rgba(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| unpack_argb(self.pixel(x, y)))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn density(&self) -> Density {
        self.density
    }

    /// True when the image has no pixels at all
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One row of pixels, top row first.
    ///
    /// # Panics
    /// Panics if `y >= self.height()`.
    pub fn row(&self, y: u32) -> &[u32] {
        assert!(y < self.height, "row {} out of bounds for height {}", y, self.height);
        let start = self.offset + y as usize * self.stride;
        &self.pixels[start..start + self.width as usize]
    }

    /// Iterate rows in scan order
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.row(y)[x as usize]
    }

    /// Whether both images read from the same pixel allocation
    pub fn shares_buffer(&self, other: &RasterImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// A view onto `rect`, which must already be clamped to this image.
    pub(crate) fn view(&self, rect: CropRect) -> Self {
        if rect.width == 0 || rect.height == 0 {
            return Self {
                width: rect.width,
                height: rect.height,
                density: self.density,
                pixels: Arc::clone(&self.pixels),
                offset: 0,
                stride: self.stride,
            };
        }

        Self {
            width: rect.width,
            height: rect.height,
            density: self.density,
            pixels: Arc::clone(&self.pixels),
            offset: self.offset + rect.y as usize * self.stride + rect.x as usize,
            stride: self.stride,
        }
    }
}

fn pack_argb(p: Rgba<u8>) -> u32 {
    let [r, g, b, a] = p.0;
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_argb(argb: u32) -> Rgba<u8> {
    Rgba([
        (argb >> 16) as u8,
        (argb >> 8) as u8,
        argb as u8,
        (argb >> 24) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RasterImage {
        let pixels = (0..width * height).map(|i| 0xFF00_0000 | i).collect();
        RasterImage::new(width, height, Density(400), pixels).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_buffer_length() {
        let err = RasterImage::new(4, 4, Density(400), vec![0; 15]).unwrap_err();
        assert!(matches!(err, ScreenshotError::BufferSize { expected: 16, actual: 15 }));
    }

    #[test]
    fn test_rows_are_row_major() {
        let img = gradient(3, 2);
        assert_eq!(img.row(0), &[0xFF00_0000, 0xFF00_0001, 0xFF00_0002]);
        assert_eq!(img.row(1), &[0xFF00_0003, 0xFF00_0004, 0xFF00_0005]);
        assert_eq!(img.rows().count(), 2);
    }

    #[test]
    fn test_view_reads_sub_rectangle() {
        let img = gradient(4, 4);
        let view = img.view(CropRect { x: 1, y: 2, width: 2, height: 2 });

        assert_eq!(view.dimensions(), (2, 2));
        assert_eq!(view.row(0), &[0xFF00_0009, 0xFF00_000A]);
        assert_eq!(view.row(1), &[0xFF00_000D, 0xFF00_000E]);
        assert!(view.shares_buffer(&img));
    }

    #[test]
    fn test_rgba_conversion_is_lossless() {
        let img = RasterImage::new(2, 1, Density(320), vec![0x80FF_2010, 0x0001_0203]).unwrap();
        let rgba = img.to_rgba();

        assert_eq!(rgba.get_pixel(0, 0).0, [0xFF, 0x20, 0x10, 0x80]);
        let back = RasterImage::from_rgba(&rgba, Density(320));
        assert_eq!(back.row(0), img.row(0));
    }

    #[test]
    fn test_density_display() {
        assert_eq!(Density(400).to_string(), "400dpi");
    }
}
