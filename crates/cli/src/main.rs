//! screencheck CLI - Main Entry Point
//!
//! Runs screenshot suites, compares and crops individual images, and manages
//! captures and baselines.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use screencheck::ComparatorConfig;

mod commands;
mod output;

use commands::{baseline, image, suite};

/// screencheck - pixel-exact screenshot regression checks
#[derive(Parser)]
#[command(name = "screencheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, default_value = "screencheck.toml", env = "SCREENCHECK_CONFIG", global = true)]
    config: PathBuf,

    /// Directory captures are written to
    #[arg(long, env = "SCREENCHECK_CAPTURE_ROOT", global = true)]
    capture_root: Option<PathBuf>,

    /// Directory holding reference images
    #[arg(long, env = "SCREENCHECK_REFERENCE_ROOT", global = true)]
    reference_root: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run screenshot suites
    Run(suite::RunArgs),

    /// Compare a screenshot file against a reference file
    Compare(image::CompareArgs),

    /// Crop an image file by percentages
    Crop(image::CropArgs),

    /// Print the capture file name for an identity
    Name(image::NameArgs),

    /// Manage captures and baselines
    #[command(subcommand)]
    Baseline(baseline::BaselineCommands),
}

impl Cli {
    fn comparator_config(&self) -> anyhow::Result<ComparatorConfig> {
        let mut config = ComparatorConfig::load(&self.config)
            .with_context(|| format!("Failed to load config {}", self.config.display()))?;

        if let Some(root) = &self.capture_root {
            config.capture_root = root.clone();
        }
        if let Some(root) = &self.reference_root {
            config.reference_root = root.clone();
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.comparator_config()?;
    tracing::debug!(
        "Captures at {}, references at {}",
        config.capture_root.display(),
        config.reference_root.display()
    );

    let success = match cli.command {
        Commands::Run(args) => suite::execute(args, config, cli.format)?,
        Commands::Compare(args) => image::compare(args, &config, cli.format)?,
        Commands::Crop(args) => image::crop(args, &config)?,
        Commands::Name(args) => image::name(args),
        Commands::Baseline(cmd) => baseline::execute(cmd, &config, cli.format)?,
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let cli = Cli::try_parse_from([
            "screencheck",
            "--config",
            "/nonexistent/screencheck.toml",
            "--reference-root",
            "assets",
            "baseline",
            "clear",
            "ScreenTest",
        ])
        .unwrap();

        let config = cli.comparator_config().unwrap();
        assert_eq!(config.reference_root, PathBuf::from("assets"));
        assert_eq!(config.capture_root, ComparatorConfig::default().capture_root);
    }
}
