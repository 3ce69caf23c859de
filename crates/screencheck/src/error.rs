//! Error types for screenshot checks

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenshotError {
    #[error("Screenshot '{name}' does not match reference: {reason}")]
    Mismatch { name: String, reason: String },

    #[error("Reference image not found: {}", path.display())]
    ReferenceNotFound { path: PathBuf },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid quality {0}: expected a value in 0..=100")]
    InvalidQuality(u8),

    #[error("Cannot encode an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} values, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Suite spec parse error: {0}")]
    SpecParse(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type ScreenshotResult<T> = Result<T, ScreenshotError>;
