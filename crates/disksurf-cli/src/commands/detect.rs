use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use disksurf_core::detection::{detect_surface, DetectionConfig, DisambiguationPolicy};
use disksurf_core::io::{cube_cards, read_cube, write_cube, HeaderValue};

use crate::summary::print_detection_summary;

#[derive(Clone, ValueEnum)]
pub enum PolicyArg {
    PerSide,
    Strict,
}

/// Detection flags shared by `detect` and `run`.
#[derive(Args)]
pub struct DetectionFlags {
    /// Detection threshold in noise standard deviations
    #[arg(long, default_value = "5.0")]
    pub sigma: f64,

    /// Disk position angle in degrees, east of north
    #[arg(long)]
    pub pa: Option<f64>,

    /// Row of the star in the rotated image
    #[arg(long)]
    pub star_row: Option<f64>,

    /// Near/far disambiguation policy
    #[arg(long, value_enum, default_value = "per-side")]
    pub policy: PolicyArg,

    /// Channel used to estimate the noise
    #[arg(long, default_value = "1")]
    pub noise_channel: usize,

    /// Minimum peak separation in pixels (default: beam major axis)
    #[arg(long)]
    pub min_separation: Option<f64>,
}

impl DetectionFlags {
    pub fn to_config(&self) -> DetectionConfig {
        DetectionConfig {
            sigma: self.sigma,
            position_angle: self.pa,
            star_row: self.star_row,
            disambiguation: match self.policy {
                PolicyArg::PerSide => DisambiguationPolicy::PerSideReplacement,
                PolicyArg::Strict => DisambiguationPolicy::StrictStrip,
            },
            noise_channel: self.noise_channel,
            min_separation: self.min_separation,
            keep_rotated: false,
        }
    }
}

#[derive(Args)]
pub struct DetectArgs {
    /// Input FITS cube
    pub file: PathBuf,

    #[command(flatten)]
    pub detection: DetectionFlags,

    /// Save the rotated channel images as a FITS cube
    #[arg(long)]
    pub rotated: Option<PathBuf>,
}

pub fn run(args: &DetectArgs) -> Result<()> {
    let cube = read_cube(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut config = args.detection.to_config();
    config.keep_rotated = args.rotated.is_some();
    let detection = detect_surface(&cube, &config)?;

    print_detection_summary(&config, &detection);

    println!("{:>7}  {:>10}  {:>6}  {:>8}  {:>8}", "Channel", "v (km/s)", "n", "pairs", "pruned");
    println!("{}", "-".repeat(47));
    for ch in &detection.channels {
        println!(
            "{:>7}  {:>10.3}  {:>6}  {:>8}  {:>8}",
            ch.index,
            ch.velocity,
            ch.n(),
            ch.diagnostics.columns_with_pair,
            ch.diagnostics.pruned_final
        );
    }

    if let (Some(path), Some(stack)) = (args.rotated.as_ref(), detection.rotated.as_ref()) {
        let mut cards = cube_cards(&cube);
        cards.push(("ORIGIN", HeaderValue::Text("disksurf".into())));
        write_cube(path, stack, &cards)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nRotated channels saved to {}", path.display());
    }

    Ok(())
}
