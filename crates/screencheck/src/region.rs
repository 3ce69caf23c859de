//! Percentage-based region selection and cropping

use serde::{Deserialize, Serialize};

use crate::error::{ScreenshotError, ScreenshotResult};
use crate::raster::RasterImage;

/// A rectangle in pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Sub-rectangle of a source image expressed as percentages of its own size.
///
/// `bottom_offset` is measured in rows from the top edge of the source, so
/// `(0, 10, 100, 100)` drops the top tenth of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegionPercentages", into = "RegionPercentages")]
pub struct RegionSpec {
    left_offset: f32,
    bottom_offset: f32,
    width_share: f32,
    height_share: f32,
}

impl RegionSpec {
    /// Selects the whole image
    pub const FULL: RegionSpec = RegionSpec {
        left_offset: 0.0,
        bottom_offset: 0.0,
        width_share: 100.0,
        height_share: 100.0,
    };

    pub fn new(
        left_offset: f32,
        bottom_offset: f32,
        width_share: f32,
        height_share: f32,
    ) -> ScreenshotResult<Self> {
        for (name, value) in [
            ("left_offset", left_offset),
            ("bottom_offset", bottom_offset),
            ("width_share", width_share),
            ("height_share", height_share),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ScreenshotError::InvalidRegion(format!(
                    "{} must be within 0..=100, got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            left_offset,
            bottom_offset,
            width_share,
            height_share,
        })
    }

    pub fn height_share(&self) -> f32 {
        self.height_share
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Pixel rectangle selected from a `width` x `height` source.
    ///
    /// Each length is divided by 100 before it is scaled by its percentage.
    /// Reference images were produced with this exact order, so it must not be
    /// rearranged. The result is clamped to the source bounds.
    pub fn crop_rect(&self, width: u32, height: u32) -> CropRect {
        let x = if self.left_offset == 0.0 {
            0
        } else {
            round_px(width as f32 / 100.0 * self.left_offset)
        }
        .min(width);

        let y = if self.bottom_offset == 0.0 {
            0
        } else {
            round_px(height as f32 / 100.0 * self.bottom_offset)
        }
        .min(height);

        let crop_width = if self.width_share == 100.0 {
            width - x
        } else {
            round_px((width - x) as f32 / 100.0 * self.width_share)
        }
        .min(width - x);

        let crop_height = if self.height_share == 100.0 {
            height - y
        } else {
            round_px((height - y) as f32 / 100.0 * self.height_share)
        }
        .min(height - y);

        CropRect {
            x,
            y,
            width: crop_width,
            height: crop_height,
        }
    }
}

impl Default for RegionSpec {
    fn default() -> Self {
        Self::FULL
    }
}

fn round_px(value: f32) -> u32 {
    value.round() as u32
}

/// Crop `image` to `region`.
///
/// A full region hands back the source itself (same pixel buffer). Any other
/// region yields a view onto the source buffer; zero-area selections produce an
/// empty image rather than an error.
pub fn crop(image: &RasterImage, region: &RegionSpec) -> RasterImage {
    if region.is_full() {
        return image.clone();
    }

    let rect = region.crop_rect(image.width(), image.height());
    image.view(rect)
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RegionPercentages {
    left_offset: f32,
    bottom_offset: f32,
    width_share: f32,
    height_share: f32,
}

impl Default for RegionPercentages {
    fn default() -> Self {
        RegionSpec::FULL.into()
    }
}

impl From<RegionSpec> for RegionPercentages {
    fn from(r: RegionSpec) -> Self {
        Self {
            left_offset: r.left_offset,
            bottom_offset: r.bottom_offset,
            width_share: r.width_share,
            height_share: r.height_share,
        }
    }
}

impl TryFrom<RegionPercentages> for RegionSpec {
    type Error = ScreenshotError;

    fn try_from(p: RegionPercentages) -> ScreenshotResult<Self> {
        RegionSpec::new(p.left_offset, p.bottom_offset, p.width_share, p.height_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Density;
    use test_case::test_case;

    #[test_case(0.0, 0.0, 100.0, 100.0, 1080, 2340 => (0, 0, 1080, 2340); "full image")]
    #[test_case(0.0, 0.0, 100.0, 90.0, 1080, 2340 => (0, 0, 1080, 2106); "bottom tenth dropped")]
    #[test_case(0.0, 0.0, 50.0, 50.0, 1080, 2340 => (0, 0, 540, 1170); "top left quarter")]
    #[test_case(10.0, 0.0, 100.0, 100.0, 1000, 500 => (100, 0, 900, 500); "left offset keeps remaining width")]
    #[test_case(0.0, 50.0, 100.0, 100.0, 1000, 500 => (0, 250, 1000, 250); "row offset keeps remaining height")]
    #[test_case(25.0, 25.0, 50.0, 50.0, 400, 200 => (100, 50, 150, 75); "shares apply to remainder")]
    #[test_case(0.0, 0.0, 0.0, 100.0, 400, 200 => (0, 0, 0, 200); "zero width share")]
    #[test_case(100.0, 0.0, 100.0, 100.0, 400, 200 => (400, 0, 0, 200); "offset at right edge")]
    fn test_crop_rect(left: f32, bottom: f32, w: f32, h: f32, src_w: u32, src_h: u32) -> (u32, u32, u32, u32) {
        let rect = RegionSpec::new(left, bottom, w, h).unwrap().crop_rect(src_w, src_h);
        (rect.x, rect.y, rect.width, rect.height)
    }

    #[test]
    fn test_full_region_returns_same_image() {
        let img = RasterImage::filled(1080, 2340, Density(400), 0xFFFF_FFFF);
        let cropped = crop(&img, &RegionSpec::default());

        assert!(cropped.shares_buffer(&img));
        assert_eq!(cropped.dimensions(), img.dimensions());
        assert_eq!(cropped.density(), img.density());
    }

    #[test]
    fn test_partial_crop_keeps_density_and_pixels() {
        let pixels = (0..100u32).collect();
        let img = RasterImage::new(10, 10, Density(480), pixels).unwrap();
        let region = RegionSpec::new(20.0, 30.0, 50.0, 50.0).unwrap();
        let cropped = crop(&img, &region);

        // x = 2, y = 3, width = round(8 / 100 * 50) = 4, height = round(7 / 100 * 50) = 4
        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.density(), Density(480));
        assert_eq!(cropped.row(0), &[32, 33, 34, 35]);
        assert_eq!(cropped.row(3), &[62, 63, 64, 65]);
    }

    #[test]
    fn test_out_of_range_percentages_rejected() {
        assert!(RegionSpec::new(-1.0, 0.0, 100.0, 100.0).is_err());
        assert!(RegionSpec::new(0.0, 0.0, 100.5, 100.0).is_err());
        assert!(RegionSpec::new(0.0, f32::NAN, 100.0, 100.0).is_err());
    }

    #[test]
    fn test_deserialize_partial_region_uses_defaults() {
        let region: RegionSpec = serde_yaml::from_str("height_share: 90").unwrap();
        assert_eq!(region, RegionSpec::new(0.0, 0.0, 100.0, 90.0).unwrap());

        let invalid: Result<RegionSpec, _> = serde_yaml::from_str("width_share: 150");
        assert!(invalid.is_err());
    }
}
