//! objedit: mask or rotate detected objects in an image.
//!
//! The CLI reads an image, takes detections for it from a JSON file, and
//! writes the edited image. Without a pose angle every detected object is
//! masked red; with one, each object's pixels are rotated in place.
//!
//! # Detection file
//!
//! ```text
//! {
//!   "scores": [[0.05, 0.90, 0.05], ...],   // per detection, background last
//!   "boxes":  [[0.1, 0.1, 0.4, 0.4], ...]  // x_min, y_min, x_max, y_max in [0, 1]
//! }
//! ```

pub mod error;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use objedit_core::detection::PrecomputedDetector;
use objedit_core::{
    decode_image, encode_image, EditConfig, EditMode, EditPipeline, EditReport,
    InterpolationFilter, OutputFormat,
};

pub use error::CliError;

/// The objedit CLI application.
#[derive(Debug, Parser)]
#[command(name = "objedit")]
#[command(version, about)]
pub struct Cli {
    /// Input image.
    #[arg(long, short = 'i')]
    pub image: PathBuf,

    /// Where to write the edited image (.png, or .jpg/.jpeg).
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Detections for the input image, as JSON.
    #[arg(long, short = 'd')]
    pub detections: PathBuf,

    /// Azimuth angle in degrees. Selects rotate mode and sets the angle.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_angle)]
    pub azimuth: Option<f64>,

    /// Polar angle in degrees. Selects rotate mode, but the rotation angle
    /// always comes from --azimuth.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_angle)]
    pub polar: Option<f64>,

    /// JSON file with edit settings (target_class, fill_color, filter).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Detector label index to edit; overrides the config file.
    #[arg(long)]
    pub target_class: Option<usize>,

    /// Rotation filter (nearest, bilinear, lanczos3); overrides the config file.
    #[arg(long)]
    pub filter: Option<InterpolationFilter>,

    /// JPEG quality (1-100) when writing .jpg output.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

/// Parse an angle in degrees, refusing `inf` and `NaN`.
fn parse_angle(s: &str) -> Result<f64, String> {
    let angle: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of degrees"))?;
    if !angle.is_finite() {
        return Err(format!("angle must be finite, got '{s}'"));
    }
    Ok(angle)
}

/// Pick the edit mode from the pose flags.
///
/// Either flag being present selects rotation, and the angle is always the
/// azimuth (0 when only `--polar` is given). The polar value itself is never
/// used. With neither flag, objects are masked.
pub fn select_mode(azimuth: Option<f64>, polar: Option<f64>) -> EditMode {
    if azimuth.is_none() && polar.is_none() {
        return EditMode::Mask;
    }
    EditMode::Rotate {
        angle_degrees: azimuth.unwrap_or(0.0),
    }
}

/// Build the edit settings: config file first, then flag overrides.
pub fn load_config(cli: &Cli) -> Result<EditConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = read_to_string(path)?;
            EditConfig::from_json(&json).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?
        }
        None => EditConfig::default(),
    };

    if let Some(target_class) = cli.target_class {
        config.target_class = target_class;
    }
    if let Some(filter) = cli.filter {
        config.filter = filter;
    }
    Ok(config)
}

/// Run the objedit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let report = execute(&cli)?;

    println!("Output saved to {}", cli.output.display());
    println!(
        "Edited {} of {} detected region(s)",
        report.applied, report.candidates
    );
    if !report.skipped.is_empty() {
        println!("Skipped {} invalid region(s)", report.skipped.len());
    }
    Ok(())
}

/// Load, edit, and save one image.
///
/// Nothing is written unless every step before the write succeeds.
pub fn execute(cli: &Cli) -> Result<EditReport, CliError> {
    let config = load_config(cli)?;
    let mode = select_mode(cli.azimuth, cli.polar);
    info!(%mode, target_class = config.target_class, filter = %config.filter, "starting edit");

    let bytes = fs::read(&cli.image).map_err(|source| CliError::Io {
        path: cli.image.clone(),
        source,
    })?;
    let image = decode_image(&bytes).map_err(|source| CliError::Decode {
        path: cli.image.clone(),
        source,
    })?;

    let detector = PrecomputedDetector::from_path(&cli.detections)?;
    let outcome = EditPipeline::new(config).detect_and_run(&detector, image, mode)?;

    let mut format = OutputFormat::from_path(&cli.output);
    if let Some(quality) = cli.quality {
        format = format.with_quality(quality);
    }
    let encoded = encode_image(&outcome.image, format)?;

    fs::write(&cli.output, encoded).map_err(|source| CliError::Io {
        path: cli.output.clone(),
        source,
    })?;

    Ok(outcome.report)
}

fn read_to_string(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
