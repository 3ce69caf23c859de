//! Stable file naming for captures and references

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::raster::{Density, RasterImage};

/// Identity of a screenshot: which folder it belongs to, which check produced
/// it, and the geometry it was captured at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComparisonIdentity {
    pub folder: String,
    pub ref_name: String,
    pub width: u32,
    pub height: u32,
    pub density: Density,
}

impl ComparisonIdentity {
    /// Identity of `image` as captured for `folder`/`ref_name`
    pub fn for_image(folder: &str, ref_name: &str, image: &RasterImage) -> Self {
        Self {
            folder: folder.to_string(),
            ref_name: ref_name.to_string(),
            width: image.width(),
            height: image.height(),
            density: image.density(),
        }
    }

    /// `{ref_name}_{width}x{height}_{density}dpi.png`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}x{}_{}.png",
            self.ref_name, self.width, self.height, self.density
        )
    }

    /// Recover an identity from a file name produced by [`file_name`](Self::file_name).
    ///
    /// Reference loading takes the density of a golden image from here.
    pub fn parse(folder: &str, file_name: &str) -> Option<Self> {
        let stem = Path::new(file_name).file_stem()?.to_str()?;
        let (rest, density) = stem.rsplit_once('_')?;
        let density = density.strip_suffix("dpi")?.parse().ok().map(Density)?;
        let (ref_name, size) = rest.rsplit_once('_')?;
        let (width, height) = size.split_once('x')?;

        if ref_name.is_empty() {
            return None;
        }

        Some(Self {
            folder: folder.to_string(),
            ref_name: ref_name.to_string(),
            width: width.parse().ok()?,
            height: height.parse().ok()?,
            density,
        })
    }
}

impl fmt::Display for ComparisonIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.folder, self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_format() {
        let img = RasterImage::filled(1080, 2106, Density(400), 0);
        let identity = ComparisonIdentity::for_image("ScreenTest", "case1", &img);

        assert_eq!(identity.file_name(), "case1_1080x2106_400dpi.png");
        assert_eq!(identity.to_string(), "ScreenTest/case1_1080x2106_400dpi.png");
    }

    #[test]
    fn test_parse_inverts_file_name() {
        let identity = ComparisonIdentity {
            folder: "FragmentAuthPhoneInputViewTest".to_string(),
            ref_name: "phone_number_not_found".to_string(),
            width: 1080,
            height: 2340,
            density: Density(420),
        };

        let parsed = ComparisonIdentity::parse(&identity.folder, &identity.file_name()).unwrap();
        assert_eq!(parsed, identity);
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(ComparisonIdentity::parse("f", "screenshot.png").is_none());
        assert!(ComparisonIdentity::parse("f", "case_1080x2340_highdpi.png").is_none());
        assert!(ComparisonIdentity::parse("f", "_1080x2340_400dpi.png").is_none());
    }
}
