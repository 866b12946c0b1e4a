use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use disksurf_core::io::FitsReader;

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS cube
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = FitsReader::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let info = reader.cube_info(&args.file)?;

    println!("File:        {}", info.filename.display());
    if let Some(ref object) = info.object {
        println!("Object:      {}", object);
    }
    println!("Channels:    {}", info.channels);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("BITPIX:      {}", info.bitpix);
    println!("Pixel scale: {:.4} arcsec", info.pixelscale);
    println!(
        "Beam:        {:.3}\" x {:.3}\" at {:.1} deg",
        info.beam.major, info.beam.minor, info.beam.angle
    );
    println!(
        "Velocity:    {:.3} to {:.3} km/s",
        info.velocity_range.0, info.velocity_range.1
    );
    match info.rest_frequency {
        Some(nu) => println!("Rest freq:   {:.6} GHz", nu / 1e9),
        None => println!("Rest freq:   unknown"),
    }
    if let Some(ref unit) = info.unit {
        println!("Unit:        {}", unit);
    }

    let data_bytes = reader.header.data_byte_size()?;
    println!("Data size:   {:.1} MB", data_bytes as f64 / (1024.0 * 1024.0));

    Ok(())
}
