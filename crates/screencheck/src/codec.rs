//! PNG/JPEG encoding and decoding of raster images

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageEncoder};

use crate::error::{ScreenshotError, ScreenshotResult};
use crate::raster::{Density, RasterImage};

/// On-disk format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedFormat {
    /// Always lossless; quality picks the compression effort
    Png,
    /// Lossy at the requested quality
    Jpeg,
}

impl EncodedFormat {
    pub fn from_path(path: &Path) -> ScreenshotResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(ScreenshotError::UnsupportedFormat(format!(
                "'{}' ({})",
                other,
                path.display()
            ))),
        }
    }
}

/// Encode `image` into `writer`. `quality` is 0..=100.
pub fn encode<W: Write>(
    writer: W,
    image: &RasterImage,
    format: EncodedFormat,
    quality: u8,
) -> ScreenshotResult<()> {
    if quality > 100 {
        return Err(ScreenshotError::InvalidQuality(quality));
    }
    if image.is_empty() {
        return Err(ScreenshotError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    let (width, height) = image.dimensions();
    let rgba = image.to_rgba();

    match format {
        EncodedFormat::Png => {
            let compression = match quality {
                0..=33 => CompressionType::Fast,
                34..=66 => CompressionType::Default,
                _ => CompressionType::Best,
            };
            PngEncoder::new_with_quality(writer, compression, FilterType::Adaptive).write_image(
                rgba.as_raw(),
                width,
                height,
                ColorType::Rgba8,
            )?;
        }
        EncodedFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            JpegEncoder::new_with_quality(writer, quality.max(1)).write_image(
                rgb.as_raw(),
                width,
                height,
                ColorType::Rgb8,
            )?;
        }
    }

    Ok(())
}

/// Encode `image` to `path`, replacing any existing file.
pub fn write_file(path: &Path, image: &RasterImage, quality: u8) -> ScreenshotResult<()> {
    let format = EncodedFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    encode(&mut writer, image, format, quality)?;
    writer.flush()?;
    Ok(())
}

/// Decode any supported image from `reader`, tagging it with `density`.
pub fn decode<R: BufRead + Seek>(reader: R, density: Density) -> ScreenshotResult<RasterImage> {
    let decoded = image::io::Reader::new(reader).with_guessed_format()?.decode()?;
    Ok(RasterImage::from_rgba(&decoded.to_rgba8(), density))
}

pub fn read_file(path: &Path, density: Density) -> ScreenshotResult<RasterImage> {
    let file = File::open(path)?;
    decode(BufReader::new(file), density)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> RasterImage {
        let pixels = (0..64u32).map(|i| 0xFF00_0000 | i * 0x0003_0507).collect();
        RasterImage::new(8, 8, Density(400), pixels).unwrap()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(EncodedFormat::from_path(Path::new("a/b.PNG")).unwrap(), EncodedFormat::Png);
        assert_eq!(EncodedFormat::from_path(Path::new("b.jpeg")).unwrap(), EncodedFormat::Jpeg);
        assert!(EncodedFormat::from_path(Path::new("b.bmp")).is_err());
        assert!(EncodedFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_png_is_lossless_at_every_quality() {
        let img = sample();
        for quality in [0u8, 50, 100] {
            let mut buf = Vec::new();
            encode(&mut buf, &img, EncodedFormat::Png, quality).unwrap();
            let back = decode(Cursor::new(buf), img.density()).unwrap();
            assert!(img.rows().eq(back.rows()), "quality {} altered pixels", quality);
        }
    }

    #[test]
    fn test_jpeg_keeps_dimensions() {
        let img = sample();
        let mut buf = Vec::new();
        encode(&mut buf, &img, EncodedFormat::Jpeg, 80).unwrap();
        let back = decode(Cursor::new(buf), Density(400)).unwrap();
        assert_eq!(back.dimensions(), (8, 8));
    }

    #[test]
    fn test_rejects_quality_and_empty_images() {
        let mut buf = Vec::new();
        assert!(matches!(
            encode(&mut buf, &sample(), EncodedFormat::Png, 101),
            Err(ScreenshotError::InvalidQuality(101))
        ));

        let empty = RasterImage::filled(0, 10, Density(400), 0);
        assert!(matches!(
            encode(&mut buf, &empty, EncodedFormat::Png, 100),
            Err(ScreenshotError::EmptyImage { width: 0, height: 10 })
        ));
    }
}
