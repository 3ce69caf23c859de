//! Capture collaborators: where candidate screenshots come from

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::raster::{Density, RasterImage};

/// Backend mocking requested for a capture.
///
/// Passed to [`CaptureSource::prepare`] before each capture so the host can
/// switch its network layer into the wanted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockApiConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Status the mocked backend should answer with
    #[serde(default)]
    pub status_code: Option<u16>,

    #[serde(default)]
    pub message: Option<String>,
}

impl MockApiConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Mocks enabled, forcing a specific response
    pub fn responding(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            enabled: true,
            status_code: Some(status_code),
            message: Some(message.into()),
        }
    }
}

/// Produces the screenshot of the screen under test.
pub trait CaptureSource {
    /// Pre-capture setup hook
    fn prepare(&mut self, _mock: &MockApiConfig) -> ScreenshotResult<()> {
        Ok(())
    }

    fn capture(&mut self) -> ScreenshotResult<RasterImage>;
}

/// A capture that was already written to disk by the device or emulator
#[derive(Debug, Clone)]
pub struct FileCapture {
    path: PathBuf,
    density: Density,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>, density: Density) -> Self {
        Self {
            path: path.into(),
            density,
        }
    }
}

impl CaptureSource for FileCapture {
    fn prepare(&mut self, mock: &MockApiConfig) -> ScreenshotResult<()> {
        debug!(?mock, "capture {} was recorded ahead of time", self.path.display());
        Ok(())
    }

    fn capture(&mut self) -> ScreenshotResult<RasterImage> {
        codec::read_file(&self.path, self.density).map_err(|e| {
            ScreenshotError::Capture(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Hands out a fixed image and remembers the last mock setup it was given
#[derive(Debug, Clone)]
pub struct StaticCapture {
    image: RasterImage,
    last_mock: Option<MockApiConfig>,
}

impl StaticCapture {
    pub fn new(image: RasterImage) -> Self {
        Self {
            image,
            last_mock: None,
        }
    }

    pub fn last_mock(&self) -> Option<&MockApiConfig> {
        self.last_mock.as_ref()
    }
}

impl CaptureSource for StaticCapture {
    fn prepare(&mut self, mock: &MockApiConfig) -> ScreenshotResult<()> {
        self.last_mock = Some(mock.clone());
        Ok(())
    }

    fn capture(&mut self) -> ScreenshotResult<RasterImage> {
        Ok(self.image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_capture_reads_image_with_density() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("screen.png");
        codec::write_file(&path, &RasterImage::filled(6, 4, Density(1), 0xFF11_2233), 100).unwrap();

        let mut capture = FileCapture::new(&path, Density(400));
        let img = capture.capture().unwrap();
        assert_eq!(img.dimensions(), (6, 4));
        assert_eq!(img.density(), Density(400));
        assert_eq!(img.pixel(5, 3), 0xFF11_2233);
    }

    #[test]
    fn test_missing_file_capture_fails() {
        let mut capture = FileCapture::new("/nonexistent/screen.png", Density(400));
        assert!(matches!(capture.capture(), Err(ScreenshotError::Capture(_))));
    }

    #[test]
    fn test_static_capture_records_mock() {
        let mut capture = StaticCapture::new(RasterImage::filled(1, 1, Density(400), 0));
        capture.prepare(&MockApiConfig::responding(422, "Unprocessable Entity")).unwrap();

        let mock = capture.last_mock().unwrap();
        assert!(mock.enabled);
        assert_eq!(mock.status_code, Some(422));
    }

    #[test]
    fn test_mock_config_defaults() {
        let mock: MockApiConfig = serde_yaml::from_str("enabled: true").unwrap();
        assert_eq!(mock, MockApiConfig::enabled());
    }
}
