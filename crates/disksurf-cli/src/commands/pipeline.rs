use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use disksurf_core::brightness::TemperatureScale;
use disksurf_core::deprojection::{
    DeprojectedPoint, DeprojectionConfig, DiskGeometry, HeightConvention, MaskDiagnostics,
};
use disksurf_core::detection::DetectionDiagnostics;
use disksurf_core::pipeline::config::PipelineConfig;
use disksurf_core::pipeline::{run_pipeline_reported, PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use super::detect::DetectionFlags;
use crate::summary::print_pipeline_summary;

#[derive(Clone, ValueEnum)]
pub enum TemperatureArg {
    Planck,
    RayleighJeans,
    Raw,
}

#[derive(Clone, ValueEnum)]
pub enum HeightArg {
    AutoFlip,
    FarMinusMidline,
}

#[derive(Args)]
pub struct RunArgs {
    /// Input FITS cube
    pub file: PathBuf,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub detection: DetectionFlags,

    /// Disk inclination in degrees
    #[arg(long)]
    pub inc: Option<f64>,

    /// Column of the star in the rotated image
    #[arg(long)]
    pub x0: Option<f64>,

    /// Row of the star in the rotated image (also used as the detection star row)
    #[arg(long)]
    pub y0: Option<f64>,

    /// Systemic velocity in km/s
    #[arg(long)]
    pub vlsr: Option<f64>,

    /// Distance in pc; lengths are reported in au when given
    #[arg(long)]
    pub dist: Option<f64>,

    /// Half-width of the excluded velocity range around systemic, km/s
    #[arg(long, default_value = "0.4")]
    pub systemic_window: f64,

    /// Drop points beyond this radius
    #[arg(long)]
    pub max_radius: Option<f64>,

    /// Keep points with negative rotation velocity
    #[arg(long)]
    pub keep_negative_velocity: bool,

    /// Height sign convention
    #[arg(long, value_enum, default_value = "auto-flip")]
    pub height: HeightArg,

    /// Brightness temperature scale
    #[arg(long, value_enum, default_value = "planck")]
    pub temperature: TemperatureArg,

    /// Save the rotated channel images as a FITS cube
    #[arg(long)]
    pub rotated: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long, default_value = "surface.json")]
    pub output: PathBuf,
}

/// JSON document written by `run`.
#[derive(Serialize)]
struct SurfaceReport<'a> {
    n_surf: Vec<usize>,
    noise: f64,
    threshold: f64,
    detection: &'a DetectionDiagnostics,
    masks: &'a MaskDiagnostics,
    height_flipped: bool,
    velocity_flipped: bool,
    points: &'a [DeprojectedPoint],
}

struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.reset();
        self.bar.set_length(total_items.unwrap_or(1) as u64);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(args)
    };

    print_pipeline_summary(&config);

    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = Arc::new(BarReporter { bar: bar.clone() });

    let output = run_pipeline_reported(&config, reporter)?;
    bar.finish_with_message("Done");

    let report = SurfaceReport {
        n_surf: output.detection.n_surf(),
        noise: output.detection.noise,
        threshold: output.detection.threshold,
        detection: &output.detection.diagnostics,
        masks: &output.deprojection.diagnostics,
        height_flipped: output.deprojection.height_flipped,
        velocity_flipped: output.deprojection.velocity_flipped,
        points: &output.deprojection.points,
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&config.output, json)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    let masks = &output.deprojection.diagnostics;
    println!();
    println!("Detected:    {} points", masks.total);
    println!("Geometry:    {} removed", masks.removed_geometry());
    println!("Systemic:    {} removed", masks.near_systemic);
    println!("Negative v:  {} removed", masks.negative_velocity);
    println!("Kept:        {} points", masks.kept);
    println!("\nOutput saved to {}", config.output.display());

    Ok(())
}

fn build_config_from_args(args: &RunArgs) -> PipelineConfig {
    PipelineConfig {
        input: args.file.clone(),
        output: args.output.clone(),
        rotated_output: args.rotated.clone(),
        detection: args.detection.to_config(),
        geometry: DiskGeometry {
            inclination: args.inc,
            star_x: args.x0,
            star_y: args.y0,
            systemic_velocity: args.vlsr,
            distance: args.dist,
        },
        deprojection: DeprojectionConfig {
            height_convention: match args.height {
                HeightArg::AutoFlip => HeightConvention::AutoFlip,
                HeightArg::FarMinusMidline => HeightConvention::FarMinusMidline,
            },
            systemic_window: args.systemic_window,
            max_radius: args.max_radius,
            drop_negative_velocity: !args.keep_negative_velocity,
            temperature: match args.temperature {
                TemperatureArg::Planck => TemperatureScale::Planck,
                TemperatureArg::RayleighJeans => TemperatureScale::RayleighJeans,
                TemperatureArg::Raw => TemperatureScale::Raw,
            },
        },
    }
}
