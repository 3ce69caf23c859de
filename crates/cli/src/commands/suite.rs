//! Suite Commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use screencheck::runner::{CaseResult, RunnerConfig};
use screencheck::{ComparatorConfig, SuiteRunner};

use crate::output::{print_error, print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct RunArgs {
    /// Directory containing suite YAML files
    #[arg(short, long, default_value = "screencheck/suites")]
    pub suites: PathBuf,

    /// Run only suites carrying this tag
    #[arg(short, long, conflicts_with = "folder")]
    pub tag: Option<String>,

    /// Run only the suite writing to this folder
    #[arg(long)]
    pub folder: Option<String>,

    /// Output directory for the results file
    #[arg(short, long, default_value = "test-results")]
    pub output: PathBuf,
}

/// Case result display wrapper for serialization
#[derive(Serialize)]
pub struct CaseDisplay {
    pub suite: String,
    pub name: String,
    pub status: String,
    pub file_name: String,
    pub duration_ms: u64,
    pub detail: String,
}

impl From<&CaseResult> for CaseDisplay {
    fn from(r: &CaseResult) -> Self {
        Self {
            suite: r.suite.clone(),
            name: r.name.clone(),
            status: if r.success { "pass" } else { "fail" }.to_string(),
            file_name: r.file_name.clone().unwrap_or_default(),
            duration_ms: r.duration_ms,
            detail: r.error.clone().unwrap_or_default(),
        }
    }
}

impl TableDisplay for CaseDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Suite", "Case", "Status", "File", "Time", "Detail"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.suite.clone(),
            self.name.clone(),
            self.status.clone(),
            self.file_name.clone(),
            format!("{}ms", self.duration_ms),
            self.detail.clone(),
        ]
    }
}

pub fn execute(args: RunArgs, config: ComparatorConfig, format: OutputFormat) -> Result<bool> {
    let runner = SuiteRunner::with_config(RunnerConfig {
        comparator: config,
        suites_dir: args.suites,
        output_dir: args.output,
    });

    let summary = if let Some(folder) = args.folder {
        runner.run_folder(&folder)?
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag)?
    } else {
        runner.run_all()?
    };

    let displays: Vec<CaseDisplay> = summary.results.iter().map(CaseDisplay::from).collect();
    print_list(&displays, format);

    runner
        .write_results(&summary)
        .context("Failed to write results")?;

    if summary.total == 0 {
        print_error("No screenshot cases were run");
        Ok(false)
    } else if summary.all_passed() {
        print_success(&format!("{} of {} screenshot(s) match", summary.passed, summary.total));
        Ok(true)
    } else {
        print_error(&format!("{} of {} screenshot(s) failed", summary.failed, summary.total));
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_display_row() {
        let result = CaseResult {
            suite: "ScreenTest".to_string(),
            name: "case1".to_string(),
            success: false,
            duration_ms: 12,
            file_name: Some("case1_1080x2106_400dpi.png".to_string()),
            capture_sha256: None,
            outcome: None,
            error: Some("sizes match but content differs starting at row 3".to_string()),
        };

        let row = CaseDisplay::from(&result).row();
        assert_eq!(row[2], "fail");
        assert_eq!(row[3], "case1_1080x2106_400dpi.png");
        assert_eq!(row[4], "12ms");
    }

    #[test]
    fn test_run_fails_when_nothing_was_compared() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("suites")).unwrap();
        let args = |suites: PathBuf| RunArgs {
            suites,
            tag: None,
            folder: None,
            output: tmp.path().join("out"),
        };
        let config = ComparatorConfig {
            capture_root: tmp.path().join("captures"),
            ..Default::default()
        };

        let passed = execute(args(tmp.path().join("suites")), config.clone(), OutputFormat::Json).unwrap();
        assert!(!passed);

        assert!(execute(args(tmp.path().join("missing")), config, OutputFormat::Json).is_err());
    }
}
