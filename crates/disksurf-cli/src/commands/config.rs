use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use disksurf_core::deprojection::DiskGeometry;
use disksurf_core::detection::DetectionConfig;
use disksurf_core::pipeline::config::PipelineConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default PipelineConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = PipelineConfig {
        input: PathBuf::from("cube.fits"),
        output: PathBuf::from("surface.json"),
        rotated_output: None,
        detection: DetectionConfig {
            position_angle: Some(90.0),
            star_row: Some(0.0),
            ..Default::default()
        },
        geometry: DiskGeometry {
            inclination: Some(45.0),
            star_x: Some(0.0),
            star_y: Some(0.0),
            systemic_velocity: Some(0.0),
            distance: None,
        },
        ..Default::default()
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
