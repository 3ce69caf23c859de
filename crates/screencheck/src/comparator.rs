//! Capture, crop, save, load the reference, compare

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::capture::CaptureSource;
use crate::compare::{compare, ComparisonOutcome};
use crate::error::ScreenshotResult;
use crate::identity::ComparisonIdentity;
use crate::raster::{Density, RasterImage};
use crate::reference::{DirReferenceLoader, ReferenceLoader};
use crate::region::{crop, RegionSpec};
use crate::store::{sha256_file, CaptureStore};

/// Configuration for the comparator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorConfig {
    /// Where captures are written
    pub capture_root: PathBuf,

    /// Read-only tree of golden images
    pub reference_root: PathBuf,

    /// Density given to references whose file name carries none
    pub fallback_density: Density,

    /// Quality used by requests that do not set one
    pub default_quality: u8,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            capture_root: PathBuf::from("screencheck/captures"),
            reference_root: PathBuf::from("screencheck/references"),
            fallback_density: Density::BASELINE,
            default_quality: 100,
        }
    }
}

impl ComparatorConfig {
    /// Load configuration from a TOML file, or defaults if it does not exist
    pub fn load(path: &Path) -> ScreenshotResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

/// One screenshot check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotRequest {
    /// Folder shared by a group of checks, usually the test class name
    pub folder: String,

    /// Name of the check, usually the test method name
    pub ref_name: String,

    pub quality: u8,

    pub region: RegionSpec,
}

impl ScreenshotRequest {
    pub fn new(folder: impl Into<String>, ref_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            ref_name: ref_name.into(),
            quality: 100,
            region: RegionSpec::FULL,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_region(mut self, region: RegionSpec) -> Self {
        self.region = region;
        self
    }
}

/// What a completed check produced
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub identity: ComparisonIdentity,
    pub saved_path: PathBuf,
    pub capture_sha256: String,
    pub outcome: ComparisonOutcome,
}

impl ComparisonReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_pass()
    }
}

/// Runs screenshot checks against a capture store and a reference source
pub struct ScreenshotComparator {
    store: CaptureStore,
    references: Box<dyn ReferenceLoader>,
}

impl ScreenshotComparator {
    pub fn new(store: CaptureStore, references: impl ReferenceLoader + 'static) -> Self {
        Self {
            store,
            references: Box::new(references),
        }
    }

    /// Comparator over the directories named in `config`
    pub fn from_config(config: &ComparatorConfig) -> Self {
        Self::new(
            CaptureStore::new(&config.capture_root),
            DirReferenceLoader::new(&config.reference_root, config.fallback_density),
        )
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    /// Remove every capture saved under `folder`
    pub fn clear_all(&self, folder: &str) -> ScreenshotResult<()> {
        self.store.clear_all(folder)
    }

    /// Capture the screen and check it against its reference.
    ///
    /// A failing comparison is returned as an outcome; a missing reference or
    /// an I/O problem is an error.
    pub fn compare_view_screen_with_reference(
        &self,
        capture: &mut dyn CaptureSource,
        request: &ScreenshotRequest,
    ) -> ScreenshotResult<ComparisonReport> {
        let captured = capture.capture()?;
        self.compare_image_with_reference(&captured, request)
    }

    /// Check an already captured image against its reference.
    ///
    /// The file name is derived from the cropped capture, never from the
    /// reference, so a geometry change shows up as a missing reference or a
    /// size mismatch instead of a comparison against an unrelated image.
    pub fn compare_image_with_reference(
        &self,
        captured: &RasterImage,
        request: &ScreenshotRequest,
    ) -> ScreenshotResult<ComparisonReport> {
        let candidate = crop(captured, &request.region);
        let identity = ComparisonIdentity::for_image(&request.folder, &request.ref_name, &candidate);
        let file_name = identity.file_name();

        let saved_path = self
            .store
            .save(&request.folder, &file_name, &candidate, request.quality)?;
        let capture_sha256 = sha256_file(&saved_path)?;

        let reference = self.references.load(&request.folder, &file_name)?;
        let outcome = compare(&candidate, &reference);

        match outcome.mismatch() {
            None => info!("Screenshot '{}' matches reference", identity),
            Some(mismatch) => warn!("Screenshot '{}' differs: {}", identity, mismatch),
        }

        Ok(ComparisonReport {
            identity,
            saved_path,
            capture_sha256,
            outcome,
        })
    }

    /// Like [`compare_view_screen_with_reference`](Self::compare_view_screen_with_reference),
    /// but a failing outcome is an error.
    pub fn verify(
        &self,
        capture: &mut dyn CaptureSource,
        request: &ScreenshotRequest,
    ) -> ScreenshotResult<ComparisonReport> {
        let report = self.compare_view_screen_with_reference(capture, request)?;
        report.outcome.clone().into_result(&report.identity.to_string())?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::StaticCapture;
    use crate::compare::Mismatch;
    use crate::error::ScreenshotError;
    use crate::reference::MemoryReferenceLoader;
    use tempfile::TempDir;

    fn screen() -> RasterImage {
        let mut pixels = vec![0xFFFF_FFFF; 20 * 40];
        // status bar in the bottom tenth
        for p in &mut pixels[36 * 20..] {
            *p = 0xFF33_3333;
        }
        RasterImage::new(20, 40, Density(400), pixels).unwrap()
    }

    #[test]
    fn test_config_load_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ComparatorConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_quality, 100);
        assert_eq!(config.fallback_density, Density::BASELINE);
    }

    #[test]
    fn test_config_load_partial_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("screencheck.toml");
        std::fs::write(&path, "reference_root = \"assets\"\nfallback_density = 420\n").unwrap();

        let config = ComparatorConfig::load(&path).unwrap();
        assert_eq!(config.reference_root, PathBuf::from("assets"));
        assert_eq!(config.fallback_density, Density(420));
        assert_eq!(config.capture_root, PathBuf::from("screencheck/captures"));
    }

    #[test]
    fn test_cropped_capture_matches_reference() {
        let tmp = TempDir::new().unwrap();
        let region = RegionSpec::new(0.0, 0.0, 100.0, 90.0).unwrap();
        let reference = crop(&screen(), &region);
        let loader = MemoryReferenceLoader::new().with("Suite", "design_20x36_400dpi.png", reference);

        let comparator = ScreenshotComparator::new(CaptureStore::new(tmp.path()), loader);
        let request = ScreenshotRequest::new("Suite", "design").with_region(region);
        let report = comparator
            .compare_view_screen_with_reference(&mut StaticCapture::new(screen()), &request)
            .unwrap();

        assert!(report.passed());
        assert_eq!(report.saved_path, tmp.path().join("Suite/design_20x36_400dpi.png"));
        assert_eq!(report.capture_sha256.len(), 64);
    }

    #[test]
    fn test_verify_turns_mismatch_into_error() {
        let tmp = TempDir::new().unwrap();
        let loader = MemoryReferenceLoader::new().with(
            "Suite",
            "design_20x40_400dpi.png",
            RasterImage::filled(20, 40, Density(400), 0xFFFF_FFFF),
        );
        let comparator = ScreenshotComparator::new(CaptureStore::new(tmp.path()), loader);
        let request = ScreenshotRequest::new("Suite", "design");

        let report = comparator
            .compare_view_screen_with_reference(&mut StaticCapture::new(screen()), &request)
            .unwrap();
        assert_eq!(report.outcome, ComparisonOutcome::Fail(Mismatch::Content { row: 36 }));

        let err = comparator
            .verify(&mut StaticCapture::new(screen()), &request)
            .unwrap_err();
        assert!(matches!(err, ScreenshotError::Mismatch { .. }));
    }
}
