//! Exact pixel comparison between a candidate and its reference

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScreenshotError, ScreenshotResult};
use crate::raster::{Density, RasterImage};

/// Why a candidate failed to match its reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Width or height differ
    Size { expected: (u32, u32), actual: (u32, u32) },

    /// Same size, rendered for a different screen density
    Density { expected: Density, actual: Density },

    /// Same geometry, but pixels differ starting at `row` (0 = top)
    Content { row: u32 },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Size { expected, actual } => write!(
                f,
                "size mismatch: reference is {}x{}, screenshot is {}x{} (check device density)",
                expected.0, expected.1, actual.0, actual.1
            ),
            Mismatch::Density { expected, actual } => write!(
                f,
                "density mismatch: reference is {}, screenshot is {}",
                expected, actual
            ),
            Mismatch::Content { row } => write!(
                f,
                "sizes match but content differs starting at row {}",
                row
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "mismatch", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Pass,
    Fail(Mismatch),
}

impl ComparisonOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, ComparisonOutcome::Pass)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            ComparisonOutcome::Pass => None,
            ComparisonOutcome::Fail(m) => Some(m),
        }
    }

    /// Turn a failed outcome into [`ScreenshotError::Mismatch`] naming `name`.
    pub fn into_result(self, name: &str) -> ScreenshotResult<()> {
        match self {
            ComparisonOutcome::Pass => Ok(()),
            ComparisonOutcome::Fail(mismatch) => Err(ScreenshotError::Mismatch {
                name: name.to_string(),
                reason: mismatch.to_string(),
            }),
        }
    }
}

/// Compare `candidate` against `reference`.
///
/// Geometry is checked first (size, then density). Pixels are compared one
/// borrowed row at a time with exact equality; there is no tolerance.
pub fn compare(candidate: &RasterImage, reference: &RasterImage) -> ComparisonOutcome {
    if candidate.dimensions() != reference.dimensions() {
        return ComparisonOutcome::Fail(Mismatch::Size {
            expected: reference.dimensions(),
            actual: candidate.dimensions(),
        });
    }

    if candidate.density() != reference.density() {
        return ComparisonOutcome::Fail(Mismatch::Density {
            expected: reference.density(),
            actual: candidate.density(),
        });
    }

    for (row, (actual, expected)) in candidate.rows().zip(reference.rows()).enumerate() {
        if actual != expected {
            debug!(row, "first differing row");
            return ComparisonOutcome::Fail(Mismatch::Content { row: row as u32 });
        }
    }

    ComparisonOutcome::Pass
}
