//! Declarative YAML suites of screenshot checks

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capture::MockApiConfig;
use crate::comparator::ScreenshotRequest;
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::raster::Density;
use crate::region::RegionSpec;

/// A group of checks sharing one capture folder, parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSpec {
    /// Capture/reference folder, usually the test class name
    pub folder: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering suites
    #[serde(default)]
    pub tags: Vec<String>,

    /// Mock setup applied to every case that does not override it
    #[serde(default)]
    pub mock_api: MockApiConfig,

    pub cases: Vec<CaseSpec>,

    /// Directory the suite was loaded from; relative capture paths resolve against it
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// A single screenshot check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSpec {
    /// Reference name, usually the test method name
    pub name: String,

    /// Image file holding the captured screen
    pub capture: PathBuf,

    /// Density the screen was captured at
    pub density: Density,

    /// Save quality; the comparator default when unset
    #[serde(default)]
    pub quality: Option<u8>,

    #[serde(default)]
    pub region: RegionSpec,

    #[serde(default)]
    pub mock_api: Option<MockApiConfig>,
}

impl SuiteSpec {
    /// Parse a suite from YAML string
    pub fn from_yaml(yaml: &str) -> ScreenshotResult<Self> {
        let suite: Self = serde_yaml::from_str(yaml)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Parse a suite from a YAML file
    pub fn from_file(path: &Path) -> ScreenshotResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut suite = Self::from_yaml(&content).map_err(|e| {
            ScreenshotError::SpecParse(format!("{}: {}", path.display(), e))
        })?;
        suite.base_dir = path.parent().map(Path::to_path_buf);
        Ok(suite)
    }

    /// Load all suites from a directory, sorted by folder.
    ///
    /// A missing directory or an unreadable entry is an error, never an empty list.
    pub fn load_all(dir: &Path) -> ScreenshotResult<Vec<Self>> {
        if !dir.is_dir() {
            return Err(ScreenshotError::SpecParse(format!(
                "Suites directory not found: {}",
                dir.display()
            )));
        }

        let mut suites = Vec::new();

        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.map_err(|e| ScreenshotError::SpecParse(e.to_string()))?;
            let is_yaml = entry
                .path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if is_yaml {
                suites.push(Self::from_file(entry.path())?);
            }
        }

        suites.sort_by(|a, b| a.folder.cmp(&b.folder));
        Ok(suites)
    }

    /// Filter suites by tag
    pub fn filter_by_tag<'a>(suites: &'a [Self], tag: &str) -> Vec<&'a Self> {
        suites.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    /// Mock setup in effect for `case`
    pub fn mock_for(&self, case: &CaseSpec) -> MockApiConfig {
        case.mock_api.clone().unwrap_or_else(|| self.mock_api.clone())
    }

    /// Capture path of `case`, resolved against the suite's directory
    pub fn capture_path(&self, case: &CaseSpec) -> PathBuf {
        match &self.base_dir {
            Some(base) if case.capture.is_relative() => base.join(&case.capture),
            _ => case.capture.clone(),
        }
    }

    pub fn request_for(&self, case: &CaseSpec, default_quality: u8) -> ScreenshotRequest {
        ScreenshotRequest::new(&self.folder, &case.name)
            .with_quality(case.quality.unwrap_or(default_quality))
            .with_region(case.region)
    }

    fn validate(&self) -> ScreenshotResult<()> {
        if self.folder.trim().is_empty() {
            return Err(ScreenshotError::SpecParse("folder must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for case in &self.cases {
            if case.name.trim().is_empty() {
                return Err(ScreenshotError::SpecParse(format!(
                    "case in '{}' has an empty name",
                    self.folder
                )));
            }
            if !seen.insert(case.name.as_str()) {
                return Err(ScreenshotError::SpecParse(format!(
                    "duplicate case '{}' in '{}'",
                    case.name, self.folder
                )));
            }
            if let Some(quality) = case.quality.filter(|q| *q > 100) {
                return Err(ScreenshotError::InvalidQuality(quality));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH_SUITE: &str = r#"
folder: FragmentAuthPhoneInputViewTest
description: Phone number input screen
tags:
  - auth
mock_api:
  enabled: true
cases:
  - name: authPhoneInputFragmentDesign
    capture: captures/design.png
    density: 400
  - name: noPhoneNumber
    capture: captures/no_phone.png
    density: 400
    region:
      height_share: 90
  - name: phoneNumberNotFound
    capture: /abs/not_found.png
    density: 400
    region:
      height_share: 90
    mock_api:
      enabled: true
      status_code: 422
      message: Unprocessable Entity
"#;

    #[test]
    fn test_parse_suite() {
        let suite = SuiteSpec::from_yaml(AUTH_SUITE).unwrap();
        assert_eq!(suite.folder, "FragmentAuthPhoneInputViewTest");
        assert_eq!(suite.cases.len(), 3);
        assert!(suite.cases[0].region.is_full());
        assert_eq!(suite.cases[1].region.height_share(), 90.0);
        assert_eq!(suite.cases[1].quality, None);
        assert_eq!(suite.request_for(&suite.cases[1], 80).quality, 80);
    }

    #[test]
    fn test_case_mock_overrides_suite_mock() {
        let suite = SuiteSpec::from_yaml(AUTH_SUITE).unwrap();

        assert_eq!(suite.mock_for(&suite.cases[0]), MockApiConfig::enabled());
        assert_eq!(
            suite.mock_for(&suite.cases[2]),
            MockApiConfig::responding(422, "Unprocessable Entity")
        );
    }

    #[test]
    fn test_capture_path_resolves_relative_to_suite() {
        let mut suite = SuiteSpec::from_yaml(AUTH_SUITE).unwrap();
        suite.base_dir = Some(PathBuf::from("/suites"));

        assert_eq!(suite.capture_path(&suite.cases[0]), PathBuf::from("/suites/captures/design.png"));
        assert_eq!(suite.capture_path(&suite.cases[2]), PathBuf::from("/abs/not_found.png"));
    }

    #[test]
    fn test_duplicate_case_names_rejected() {
        let yaml = r#"
folder: Dup
cases:
  - { name: a, capture: a.png, density: 400 }
  - { name: a, capture: b.png, density: 400 }
"#;
        assert!(matches!(SuiteSpec::from_yaml(yaml), Err(ScreenshotError::SpecParse(_))));
    }

    #[test]
    fn test_load_all_missing_dir_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = SuiteSpec::load_all(&tmp.path().join("does-not-exist"));
        assert!(matches!(result, Err(ScreenshotError::SpecParse(_))));
    }

    #[test]
    fn test_load_all_reads_nested_yaml_only() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("auth")).unwrap();
        std::fs::write(tmp.path().join("auth/phone.yaml"), AUTH_SUITE).unwrap();
        std::fs::write(tmp.path().join("other.yml"), "folder: Other\ncases: []\n").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not a suite").unwrap();

        let suites = SuiteSpec::load_all(tmp.path()).unwrap();
        let folders: Vec<&str> = suites.iter().map(|s| s.folder.as_str()).collect();
        assert_eq!(folders, ["FragmentAuthPhoneInputViewTest", "Other"]);
        assert_eq!(suites[0].base_dir.as_deref(), Some(tmp.path().join("auth").as_path()));
    }

    #[test]
    fn test_filter_by_tag() {
        let auth = SuiteSpec::from_yaml(AUTH_SUITE).unwrap();
        let other = SuiteSpec::from_yaml("folder: Other\ncases: []\n").unwrap();
        let suites = vec![auth, other];

        let filtered = SuiteSpec::filter_by_tag(&suites, "auth");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].folder, "FragmentAuthPhoneInputViewTest");
    }
}
