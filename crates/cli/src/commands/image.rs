//! Image Commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use screencheck::{codec, compare as compare_images, crop as crop_image};
use screencheck::{ComparatorConfig, ComparisonIdentity, ComparisonOutcome, Density, RegionSpec};

use crate::output::{print_item, print_success, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct CompareArgs {
    /// Screenshot to check
    pub candidate: PathBuf,

    /// Reference image
    pub reference: PathBuf,

    /// Density of the screenshot in dpi (default: from file name)
    #[arg(long)]
    pub candidate_density: Option<u32>,

    /// Density of the reference in dpi (default: from file name)
    #[arg(long)]
    pub reference_density: Option<u32>,
}

#[derive(Args)]
pub struct CropArgs {
    /// Image to crop
    pub input: PathBuf,

    /// Where to write the cropped image (.png or .jpg)
    pub output: PathBuf,

    /// Left offset, percent of width
    #[arg(long, default_value = "0")]
    pub left: f32,

    /// Row offset from the top, percent of height
    #[arg(long, default_value = "0")]
    pub bottom: f32,

    /// Share of the remaining width to keep, percent
    #[arg(long, default_value = "100")]
    pub width_share: f32,

    /// Share of the remaining height to keep, percent
    #[arg(long, default_value = "100")]
    pub height_share: f32,

    /// Output quality 0-100 (default: from config)
    #[arg(long)]
    pub quality: Option<u8>,
}

#[derive(Args)]
pub struct NameArgs {
    /// Reference name, usually the test method
    pub ref_name: String,

    pub width: u32,

    pub height: u32,

    /// Density in dpi
    pub density: u32,
}

/// Comparison display wrapper for serialization
#[derive(Serialize)]
pub struct OutcomeDisplay {
    pub candidate: String,
    pub reference: String,
    pub outcome: ComparisonOutcome,
}

impl TableDisplay for OutcomeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Screenshot", "Reference", "Result"]
    }

    fn row(&self) -> Vec<String> {
        let result = match self.outcome.mismatch() {
            None => "pass".to_string(),
            Some(mismatch) => mismatch.to_string(),
        };
        vec![self.candidate.clone(), self.reference.clone(), result]
    }
}

fn resolve_density(path: &Path, explicit: Option<u32>, fallback: Density) -> Density {
    explicit.map(Density).unwrap_or_else(|| {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| ComparisonIdentity::parse("", name))
            .map(|identity| identity.density)
            .unwrap_or(fallback)
    })
}

pub fn compare(args: CompareArgs, config: &ComparatorConfig, format: OutputFormat) -> Result<bool> {
    let candidate_density = resolve_density(&args.candidate, args.candidate_density, config.fallback_density);
    let reference_density = resolve_density(&args.reference, args.reference_density, config.fallback_density);

    let candidate = codec::read_file(&args.candidate, candidate_density)
        .with_context(|| format!("Failed to open screenshot: {}", args.candidate.display()))?;
    let reference = codec::read_file(&args.reference, reference_density)
        .with_context(|| format!("Failed to open reference image: {}", args.reference.display()))?;

    let outcome = compare_images(&candidate, &reference);
    let passed = outcome.is_pass();

    print_item(
        &OutcomeDisplay {
            candidate: args.candidate.display().to_string(),
            reference: args.reference.display().to_string(),
            outcome,
        },
        format,
    );

    Ok(passed)
}

pub fn crop(args: CropArgs, config: &ComparatorConfig) -> Result<bool> {
    let region = RegionSpec::new(args.left, args.bottom, args.width_share, args.height_share)?;
    let quality = args.quality.unwrap_or(config.default_quality);

    let image = codec::read_file(&args.input, config.fallback_density)
        .with_context(|| format!("Failed to open image: {}", args.input.display()))?;
    let cropped = crop_image(&image, &region);

    codec::write_file(&args.output, &cropped, quality)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    print_success(&format!(
        "Cropped {}x{} to {}x{}: {}",
        image.width(),
        image.height(),
        cropped.width(),
        cropped.height(),
        args.output.display()
    ));
    Ok(true)
}

pub fn name(args: NameArgs) -> bool {
    let identity = ComparisonIdentity {
        folder: String::new(),
        ref_name: args.ref_name,
        width: args.width,
        height: args.height,
        density: Density(args.density),
    };
    println!("{}", identity.file_name());
    true
}
