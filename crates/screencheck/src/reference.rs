//! Read-only access to golden reference images

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec;
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::identity::ComparisonIdentity;
use crate::raster::{Density, RasterImage};

/// Source of reference images, addressed by folder and file name.
pub trait ReferenceLoader {
    /// Load `folder/file_name`. A missing reference is
    /// [`ScreenshotError::ReferenceNotFound`].
    fn load(&self, folder: &str, file_name: &str) -> ScreenshotResult<RasterImage>;
}

/// References stored as image files under a root directory.
///
/// Density is taken from the `_{n}dpi` suffix of the file name, falling back
/// to `fallback_density` for names without one.
#[derive(Debug, Clone)]
pub struct DirReferenceLoader {
    root: PathBuf,
    fallback_density: Density,
}

impl DirReferenceLoader {
    pub fn new(root: impl Into<PathBuf>, fallback_density: Density) -> Self {
        Self {
            root: root.into(),
            fallback_density,
        }
    }

}

impl ReferenceLoader for DirReferenceLoader {
    fn load(&self, folder: &str, file_name: &str) -> ScreenshotResult<RasterImage> {
        let path = self.root.join(folder).join(file_name);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ScreenshotError::ReferenceNotFound { path });
            }
            Err(e) => return Err(e.into()),
        };

        let density = ComparisonIdentity::parse(folder, file_name)
            .map(|identity| identity.density)
            .unwrap_or(self.fallback_density);
        let image = codec::decode(BufReader::new(file), density)?;
        debug!(
            "Loaded reference {} ({}x{} @ {})",
            path.display(),
            image.width(),
            image.height(),
            density
        );
        Ok(image)
    }
}

/// References held in memory, for hosts that embed their baselines and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryReferenceLoader {
    images: HashMap<(String, String), RasterImage>,
}

impl MemoryReferenceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, folder: &str, file_name: &str, image: RasterImage) {
        self.images
            .insert((folder.to_string(), file_name.to_string()), image);
    }

    pub fn with(mut self, folder: &str, file_name: &str, image: RasterImage) -> Self {
        self.insert(folder, file_name, image);
        self
    }
}

impl ReferenceLoader for MemoryReferenceLoader {
    fn load(&self, folder: &str, file_name: &str) -> ScreenshotResult<RasterImage> {
        self.images
            .get(&(folder.to_string(), file_name.to_string()))
            .cloned()
            .ok_or_else(|| ScreenshotError::ReferenceNotFound {
                path: Path::new(folder).join(file_name),
            })
    }
}
