use std::sync::Arc;

use tracing::info;

use crate::brightness::BrightnessConverter;
use crate::deprojection::deproject_channels;
use crate::detection::detect_surface_with_progress;
use crate::error::Result;
use crate::io::fits::{FitsReader, HeaderValue};
use crate::io::fits_writer::{cube_cards, write_cube};

use super::config::PipelineConfig;
use super::types::{NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter};

/// Run detection and deprojection on the configured cube, reporting progress.
pub fn run_pipeline_reported(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineOutput> {
    // Fail on missing geometry before touching the cube.
    let geometry = config.geometry.resolve()?;

    reporter.begin_stage(PipelineStage::Reading, None);
    let reader = FitsReader::open(&config.input)?;
    let cube = reader.read_cube()?;
    info!(
        channels = cube.nv(),
        width = cube.nx(),
        height = cube.ny(),
        pixelscale = cube.pixelscale,
        "Read FITS cube"
    );
    // The temperature scale may need cube metadata; check it before detecting.
    let converter = BrightnessConverter::new(config.deprojection.temperature, &cube)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Detecting, Some(cube.nv()));
    let mut detection_config = config.detection.clone();
    detection_config.keep_rotated |= config.rotated_output.is_some();
    if detection_config.star_row.is_none() {
        detection_config.star_row = config.geometry.star_y;
    }
    let mut detection =
        detect_surface_with_progress(&cube, &detection_config, |done| reporter.advance(done))?;
    reporter.finish_stage();

    if let (Some(path), Some(stack)) =
        (config.rotated_output.as_ref(), detection.rotated.as_ref())
    {
        reporter.begin_stage(PipelineStage::Writing, None);
        let mut cards = cube_cards(&cube);
        cards.push(("ORIGIN", HeaderValue::Text("disksurf".into())));
        write_cube(path, stack, &cards)?;
        info!(path = %path.display(), "Wrote rotated channels");
        reporter.finish_stage();
    }
    if !config.detection.keep_rotated {
        detection.rotated = None;
    }

    reporter.begin_stage(PipelineStage::Deprojecting, None);
    let deprojection = deproject_channels(
        &detection.channels,
        &geometry,
        cube.pixelscale,
        &converter,
        &config.deprojection,
    )?;
    reporter.finish_stage();

    Ok(PipelineOutput {
        detection,
        deprojection,
    })
}

/// Run the full processing pipeline.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    let reporter = Arc::new(NoOpReporter);
    run_pipeline_reported(config, reporter)
}
