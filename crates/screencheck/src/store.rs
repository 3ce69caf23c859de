//! Writable storage for captured screenshots

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::codec;
use crate::error::ScreenshotResult;
use crate::raster::RasterImage;

/// Directory tree of captures, one sub-folder per test class
#[derive(Debug, Clone)]
pub struct CaptureStore {
    root: PathBuf,
}

impl CaptureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn folder_path(&self, folder: &str) -> PathBuf {
        self.root.join(folder)
    }

    pub fn path_for(&self, folder: &str, file_name: &str) -> PathBuf {
        self.folder_path(folder).join(file_name)
    }

    /// Write `image` to `root/folder/file_name`, creating missing directories
    /// and replacing any previous capture with the same name.
    pub fn save(
        &self,
        folder: &str,
        file_name: &str,
        image: &RasterImage,
        quality: u8,
    ) -> ScreenshotResult<PathBuf> {
        let dir = self.folder_path(folder);
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(file_name);
        codec::write_file(&path, image, quality)?;

        info!("Saved screenshot to {}", path.display());
        Ok(path)
    }

    /// Remove `root/folder` and everything in it. A missing folder is not an error.
    pub fn clear_all(&self, folder: &str) -> ScreenshotResult<()> {
        let path = self.folder_path(folder);
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                info!("Cleared captures in {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Nothing to clear at {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// PNG captures in `folder`, sorted by name
    pub fn list(&self, folder: &str) -> ScreenshotResult<Vec<String>> {
        let dir = self.folder_path(folder);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().map(|e| e == "png").unwrap_or(false) {
                if let Some(name) = path.file_name() {
                    names.push(name.to_string_lossy().to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Copy every capture in `folder` into `reference_root/folder`, making the
    /// current captures the new baselines. Returns the promoted file names.
    pub fn promote(&self, folder: &str, reference_root: &Path) -> ScreenshotResult<Vec<String>> {
        let names = self.list(folder)?;
        if names.is_empty() {
            return Ok(names);
        }

        let target = reference_root.join(folder);
        std::fs::create_dir_all(&target)?;

        for name in &names {
            std::fs::copy(self.path_for(folder, name), target.join(name))?;
            info!("Updated baseline for '{}/{}'", folder, name);
        }

        Ok(names)
    }
}

/// Hash a file using SHA256
pub fn sha256_file(path: &Path) -> ScreenshotResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}
