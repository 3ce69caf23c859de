//! Serial runner for screenshot suites

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::capture::{CaptureSource, FileCapture};
use crate::comparator::{ComparatorConfig, ComparisonReport, ScreenshotComparator};
use crate::compare::ComparisonOutcome;
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::suite::{CaseSpec, SuiteSpec};

/// Result of running a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub suite: String,
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub file_name: Option<String>,
    pub capture_sha256: Option<String>,
    pub outcome: Option<ComparisonOutcome>,
    pub error: Option<String>,
}

/// Result of running every selected case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

impl RunSummary {
    /// True when at least one case ran and none failed
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.failed == 0
    }
}

/// Configuration for the suite runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub comparator: ComparatorConfig,
    pub suites_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            comparator: ComparatorConfig::default(),
            suites_dir: PathBuf::from("screencheck/suites"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Runs suites one case at a time on the calling thread
pub struct SuiteRunner {
    comparator: ScreenshotComparator,
    reference_root: PathBuf,
    default_quality: u8,
    suites_dir: PathBuf,
    output_dir: PathBuf,
}

impl SuiteRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            comparator: ScreenshotComparator::from_config(&config.comparator),
            reference_root: config.comparator.reference_root,
            default_quality: config.comparator.default_quality,
            suites_dir: config.suites_dir,
            output_dir: config.output_dir,
        }
    }

    pub fn comparator(&self) -> &ScreenshotComparator {
        &self.comparator
    }

    /// Run all suites in the suites directory
    pub fn run_all(&self) -> ScreenshotResult<RunSummary> {
        let suites = SuiteSpec::load_all(&self.suites_dir)?;
        Ok(self.run_suites(&suites))
    }

    /// Run suites carrying `tag`
    pub fn run_tagged(&self, tag: &str) -> ScreenshotResult<RunSummary> {
        let suites = SuiteSpec::load_all(&self.suites_dir)?;
        let filtered: Vec<SuiteSpec> = SuiteSpec::filter_by_tag(&suites, tag)
            .into_iter()
            .cloned()
            .collect();
        Ok(self.run_suites(&filtered))
    }

    /// Run the suite writing to `folder`
    pub fn run_folder(&self, folder: &str) -> ScreenshotResult<RunSummary> {
        let suites = SuiteSpec::load_all(&self.suites_dir)?;
        let suite = suites
            .into_iter()
            .find(|s| s.folder == folder)
            .ok_or_else(|| ScreenshotError::SpecParse(format!("Suite not found: {}", folder)))?;
        Ok(self.run_suites(std::slice::from_ref(&suite)))
    }

    pub fn run_suites(&self, suites: &[SuiteSpec]) -> RunSummary {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();

        let total_cases: usize = suites.iter().map(|s| s.cases.len()).sum();
        info!("Running {} case(s) in {} suite(s)...", total_cases, suites.len());

        for suite in suites {
            results.extend(self.run_suite(suite));
        }

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Screenshot results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        RunSummary {
            total: results.len(),
            passed,
            failed,
            started_at,
            duration_ms,
            results,
        }
    }

    /// Clear the suite's capture folder once, then run each case from its capture file.
    pub fn run_suite(&self, suite: &SuiteSpec) -> Vec<CaseResult> {
        if let Err(e) = self.comparator.clear_all(&suite.folder) {
            error!("✗ {} - could not clear captures: {}", suite.folder, e);
            return suite
                .cases
                .iter()
                .map(|case| CaseResult::errored(suite, case, 0, &e))
                .collect();
        }

        suite
            .cases
            .iter()
            .map(|case| {
                let mut capture = FileCapture::new(suite.capture_path(case), case.density);
                self.run_case(suite, case, &mut capture)
            })
            .collect()
    }

    /// Run one case against an arbitrary capture source. Errors end this case only.
    pub fn run_case(
        &self,
        suite: &SuiteSpec,
        case: &CaseSpec,
        capture: &mut dyn CaptureSource,
    ) -> CaseResult {
        let start = Instant::now();
        debug!("Running case: {}/{}", suite.folder, case.name);

        let result = self.check_case(suite, case, capture);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                let success = report.passed();
                let error = report.outcome.mismatch().map(|m| m.to_string());
                if success {
                    info!("✓ {}/{} ({} ms)", suite.folder, case.name, duration_ms);
                } else {
                    error!(
                        "✗ {}/{} - {}",
                        suite.folder,
                        case.name,
                        error.as_deref().unwrap_or("mismatch")
                    );
                }

                CaseResult {
                    suite: suite.folder.clone(),
                    name: case.name.clone(),
                    success,
                    duration_ms,
                    file_name: Some(report.identity.file_name()),
                    capture_sha256: Some(report.capture_sha256),
                    outcome: Some(report.outcome),
                    error,
                }
            }
            Err(e) => {
                error!("✗ {}/{} - {}", suite.folder, case.name, e);
                CaseResult::errored(suite, case, duration_ms, &e)
            }
        }
    }

    fn check_case(
        &self,
        suite: &SuiteSpec,
        case: &CaseSpec,
        capture: &mut dyn CaptureSource,
    ) -> ScreenshotResult<ComparisonReport> {
        capture.prepare(&suite.mock_for(case))?;
        let request = suite.request_for(case, self.default_quality);
        self.comparator
            .compare_view_screen_with_reference(capture, &request)
    }

    /// Make the current captures of `folder` its new references
    pub fn promote(&self, folder: &str) -> ScreenshotResult<Vec<String>> {
        self.comparator.store().promote(folder, &self.reference_root)
    }

    /// Write run results to a JSON file
    pub fn write_results(&self, summary: &RunSummary) -> ScreenshotResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("screencheck-results.json");
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for SuiteRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseResult {
    fn errored(suite: &SuiteSpec, case: &CaseSpec, duration_ms: u64, e: &ScreenshotError) -> Self {
        Self {
            suite: suite.folder.clone(),
            name: case.name.clone(),
            success: false,
            duration_ms,
            file_name: None,
            capture_sha256: None,
            outcome: None,
            error: Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run_is_not_a_pass() {
        let runner = SuiteRunner::new();
        let summary = runner.run_suites(&[]);
        assert_eq!(summary.total, 0);
        assert!(!summary.all_passed());

        let suite = SuiteSpec::from_yaml("folder: Empty\ncases: []\n").unwrap();
        assert!(!runner.run_suites(std::slice::from_ref(&suite)).all_passed());
    }
}
