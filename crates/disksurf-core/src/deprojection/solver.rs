use tracing::info;

use crate::brightness::BrightnessConverter;
use crate::consts::HEIGHT_FLIP_FRACTION;
use crate::cube::SpectralCube;
use crate::detection::{ChannelSurface, SurfaceDetection};
use crate::error::{DiskSurfError, Result};

use super::config::{DeprojectionConfig, DiskGeometry, HeightConvention, ResolvedGeometry};
use super::result::{DeprojectedPoint, Deprojection, MaskDiagnostics};

/// A surface point in pixel-derived disk coordinates, before masking.
struct Candidate {
    channel: usize,
    column: usize,
    delta_v: f64,
    r: f64,
    h: f64,
    v: Option<f64>,
    intensity: f64,
}

/// Rotation velocity from the line-of-sight offset. `None` when the column
/// sits on the star's column or the result is not finite.
pub fn rotation_velocity(delta_v: f64, r: f64, dx: f64, sin_i: f64) -> Option<f64> {
    let denom = dx * sin_i;
    if denom == 0.0 {
        return None;
    }
    let v = delta_v * r / denom;
    v.is_finite().then_some(v)
}

/// Deproject a detected surface using the cube's pixel scale and beam.
pub fn deproject(
    detection: &SurfaceDetection,
    cube: &SpectralCube,
    geometry: &DiskGeometry,
    config: &DeprojectionConfig,
) -> Result<Deprojection> {
    let geometry = geometry.resolve()?;
    let converter = BrightnessConverter::new(config.temperature, cube)?;
    deproject_channels(
        &detection.channels,
        &geometry,
        cube.pixelscale,
        &converter,
        config,
    )
}

/// Convert per-channel surface points into radius, height, velocity and
/// brightness, dropping points that fail the validity masks.
pub fn deproject_channels(
    channels: &[ChannelSurface],
    geometry: &ResolvedGeometry,
    pixelscale: f64,
    converter: &BrightnessConverter,
    config: &DeprojectionConfig,
) -> Result<Deprojection> {
    if !(pixelscale.is_finite() && pixelscale > 0.0) {
        return Err(DiskSurfError::InvalidParameter(format!(
            "pixel scale must be positive, got {pixelscale}"
        )));
    }
    if !(config.systemic_window >= 0.0) {
        return Err(DiskSurfError::InvalidParameter(format!(
            "systemic window must be non-negative, got {}",
            config.systemic_window
        )));
    }

    let (sin_i, cos_i) = geometry.inclination.to_radians().sin_cos();

    let mut candidates: Vec<Candidate> = channels
        .iter()
        .flat_map(|ch| {
            let delta_v = ch.velocity - geometry.systemic_velocity;
            ch.points.iter().map(move |p| {
                let y_c = p.midpoint();
                let dy = p.y_far - y_c;
                let dx = p.column as f64 - geometry.star_x;
                let r = dx.hypot(dy / cos_i);
                Candidate {
                    channel: ch.index,
                    column: p.column,
                    delta_v,
                    r,
                    h: (y_c - geometry.star_y) / sin_i,
                    v: rotation_velocity(delta_v, r, dx, sin_i),
                    intensity: p.mean_intensity(),
                }
            })
        })
        .collect();

    let total = candidates.len();
    let negatives = candidates.iter().filter(|c| c.h < 0.0).count();
    let height_flipped = config.height_convention == HeightConvention::AutoFlip
        && total > 0
        && negatives as f64 > HEIGHT_FLIP_FRACTION * total as f64;

    let scale = pixelscale * geometry.distance.unwrap_or(1.0);
    for c in &mut candidates {
        if height_flipped {
            c.h = -c.h;
        }
        c.r *= scale;
        c.h *= scale;
    }

    let mut diag = MaskDiagnostics {
        total,
        ..Default::default()
    };
    let mut mask = vec![false; total];

    for (keep, c) in mask.iter_mut().zip(&candidates) {
        if c.h < 0.0 {
            diag.negative_height += 1;
        } else if c.v.is_none() {
            diag.undefined_velocity += 1;
        } else if config.max_radius.is_some_and(|max| c.r > max) {
            diag.beyond_max_radius += 1;
        } else if c.delta_v.abs() < config.systemic_window {
            diag.near_systemic += 1;
        } else {
            *keep = true;
        }
    }

    let survivors: Vec<f64> = candidates
        .iter()
        .zip(&mask)
        .filter_map(|(c, &keep)| if keep { c.v } else { None })
        .collect();
    let velocity_flipped =
        !survivors.is_empty() && survivors.iter().sum::<f64>() / (survivors.len() as f64) < 0.0;

    let mut points = Vec::with_capacity(survivors.len());
    for (keep, c) in mask.iter_mut().zip(&candidates) {
        if !*keep {
            continue;
        }
        let Some(mut v) = c.v else {
            *keep = false;
            continue;
        };
        if velocity_flipped {
            v = -v;
        }
        if config.drop_negative_velocity && v < 0.0 {
            diag.negative_velocity += 1;
            *keep = false;
            continue;
        }
        points.push(DeprojectedPoint {
            channel: c.channel,
            column: c.column,
            r: c.r,
            h: c.h,
            v,
            tb: converter.convert(c.intensity),
        });
    }
    diag.kept = points.len();

    info!(
        total = diag.total,
        removed_geometry = diag.removed_geometry(),
        near_systemic = diag.near_systemic,
        negative_velocity = diag.negative_velocity,
        kept = diag.kept,
        height_flipped,
        velocity_flipped,
        "Deprojection complete"
    );

    Ok(Deprojection {
        points,
        mask,
        height_flipped,
        velocity_flipped,
        diagnostics: diag,
    })
}
