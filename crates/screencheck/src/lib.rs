//! screencheck: pixel-exact screenshot regression checks
//!
//! A test captures the screen under test and hands it to the comparator,
//! which crops it, saves it next to the other captures of the run, loads the
//! golden reference with the same identity and compares the two exactly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ScreenshotComparator                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CaptureSource::capture() -> RasterImage                    │
//! │  crop(image, RegionSpec) -> RasterImage (shared buffer)     │
//! │  CaptureStore::save(folder, file_name, image, quality)      │
//! │  ReferenceLoader::load(folder, file_name) -> RasterImage    │
//! │  compare(candidate, reference) -> ComparisonOutcome         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner (YAML suites, serial)                          │
//! │    ├── clear_all(folder) once per suite                     │
//! │    ├── prepare(MockApiConfig) + compare per case            │
//! │    └── write_results() -> screencheck-results.json          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! File names follow `{ref_name}_{width}x{height}_{density}dpi.png`, derived
//! from the cropped capture.

pub mod capture;
pub mod codec;
pub mod comparator;
pub mod compare;
pub mod error;
pub mod identity;
pub mod raster;
pub mod reference;
pub mod region;
pub mod runner;
pub mod store;
pub mod suite;

pub use capture::{CaptureSource, FileCapture, MockApiConfig, StaticCapture};
pub use comparator::{ComparatorConfig, ComparisonReport, ScreenshotComparator, ScreenshotRequest};
pub use compare::{compare, ComparisonOutcome, Mismatch};
pub use error::{ScreenshotError, ScreenshotResult};
pub use identity::ComparisonIdentity;
pub use raster::{Density, RasterImage};
pub use reference::{DirReferenceLoader, MemoryReferenceLoader, ReferenceLoader};
pub use region::{crop, CropRect, RegionSpec};
pub use runner::{RunSummary, SuiteRunner};
pub use store::CaptureStore;
pub use suite::{CaseSpec, SuiteSpec};
