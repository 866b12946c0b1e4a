use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{Array2, Array3, ArrayView2, Axis};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::consts::PARALLEL_CHANNEL_THRESHOLD;
use crate::cube::SpectralCube;
use crate::error::{DiskSurfError, Result};
use crate::rotate::{rotate_image, zero_non_finite};

use super::column::{select_pair, ColumnPair};
use super::config::{DetectionConfig, DisambiguationPolicy};
use super::noise::noise_floor;
use super::peaks::find_peaks;
use super::subpixel::refine_peak_quadratic;
use super::trend::prune_by_trend;

/// Near/far surface crossings detected in one column of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SurfacePoint {
    /// Column (along the major axis) in the rotated image.
    pub column: usize,
    /// Sub-pixel row of the near-side crossing.
    pub y_near: f64,
    /// Sub-pixel row of the far-side crossing.
    pub y_far: f64,
    /// Refined peak intensity at the near crossing, in cube units.
    pub t_near: f64,
    /// Refined peak intensity at the far crossing, in cube units.
    pub t_far: f64,
}

impl SurfacePoint {
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.y_near + self.y_far)
    }

    pub fn mean_intensity(&self) -> f64 {
        0.5 * (self.t_near + self.t_far)
    }
}

/// Counters describing why columns of a channel were dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChannelDiagnostics {
    /// Columns with at least two peaks above threshold.
    pub columns_with_pair: usize,
    /// Columns dropped by the stellar-position rule.
    pub rejected_by_star: usize,
    /// Columns failing the first straddle test.
    pub pruned_first_pass: usize,
    /// Columns failing the final straddle test.
    pub pruned_final: usize,
    /// Too few columns to fit the midline; the channel reports no points.
    pub below_trend_minimum: bool,
    /// Peaks whose quadratic was degenerate and kept the integer position.
    pub degenerate_refinements: usize,
}

/// Surface points detected in one velocity channel.
#[derive(Clone, Debug, Serialize)]
pub struct ChannelSurface {
    pub index: usize,
    /// Channel velocity in km/s.
    pub velocity: f64,
    pub points: Vec<SurfacePoint>,
    pub diagnostics: ChannelDiagnostics,
}

impl ChannelSurface {
    /// Number of valid columns.
    pub fn n(&self) -> usize {
        self.points.len()
    }
}

/// Totals over every channel of a detection run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DetectionDiagnostics {
    pub channels: usize,
    pub channels_with_points: usize,
    pub channels_below_trend_minimum: usize,
    pub columns_with_pair: usize,
    pub rejected_by_star: usize,
    pub pruned_by_trend: usize,
    pub degenerate_refinements: usize,
    pub points: usize,
}

impl DetectionDiagnostics {
    fn accumulate(channels: &[ChannelSurface]) -> Self {
        let mut d = Self {
            channels: channels.len(),
            ..Default::default()
        };
        for ch in channels {
            let c = &ch.diagnostics;
            d.channels_with_points += usize::from(ch.n() > 0);
            d.channels_below_trend_minimum += usize::from(c.below_trend_minimum);
            d.columns_with_pair += c.columns_with_pair;
            d.rejected_by_star += c.rejected_by_star;
            d.pruned_by_trend += c.pruned_final;
            d.degenerate_refinements += c.degenerate_refinements;
            d.points += ch.n();
        }
        d
    }
}

/// Surface points for every channel of a cube.
#[derive(Clone, Debug)]
pub struct SurfaceDetection {
    pub channels: Vec<ChannelSurface>,
    /// Noise standard deviation of the reference channel.
    pub noise: f64,
    /// Peak threshold, `sigma * noise`.
    pub threshold: f64,
    /// Minimum peak separation in pixels.
    pub min_separation: f64,
    pub diagnostics: DetectionDiagnostics,
    /// Rotated channel images, when requested.
    pub rotated: Option<Array3<f32>>,
}

impl SurfaceDetection {
    /// Valid column count per channel.
    pub fn n_surf(&self) -> Vec<usize> {
        self.channels.iter().map(ChannelSurface::n).collect()
    }

    pub fn total_points(&self) -> usize {
        self.channels.iter().map(ChannelSurface::n).sum()
    }
}

/// Per-channel detection parameters shared by every channel of a run.
#[derive(Clone, Copy, Debug)]
pub struct ChannelParams {
    pub threshold: f64,
    pub min_separation: f64,
    pub star_row: Option<f64>,
    pub policy: DisambiguationPolicy,
}

/// Detect the near/far surface in one (already rotated) channel image.
pub fn detect_channel(
    image: ArrayView2<'_, f32>,
    params: &ChannelParams,
) -> (Vec<SurfacePoint>, ChannelDiagnostics) {
    let mut diag = ChannelDiagnostics::default();
    let mut candidates = Vec::new();
    let threshold = params.threshold as f32;

    for (col, column) in image.axis_iter(Axis(1)).enumerate() {
        let profile = column.to_vec();
        let peaks = find_peaks(&profile, Some(threshold), params.min_separation);

        let (near, far) = match select_pair(&peaks, params.star_row, params.policy) {
            ColumnPair::Pair { near, far } => (near, far),
            ColumnPair::TooFewPeaks => continue,
            ColumnPair::RejectedByStar => {
                diag.columns_with_pair += 1;
                diag.rejected_by_star += 1;
                continue;
            }
        };
        diag.columns_with_pair += 1;

        let near = refine_peak_quadratic(&profile, near);
        let far = refine_peak_quadratic(&profile, far);
        diag.degenerate_refinements += usize::from(!near.refined) + usize::from(!far.refined);

        candidates.push(SurfacePoint {
            column: col,
            y_near: near.position,
            y_far: far.position,
            t_near: near.value,
            t_far: far.value,
        });
    }

    let pruned = prune_by_trend(&candidates);
    diag.below_trend_minimum = pruned.insufficient && !candidates.is_empty();
    diag.pruned_first_pass = pruned.first_pass_removed;
    diag.pruned_final = if pruned.insufficient {
        candidates.len()
    } else {
        pruned.second_pass_removed
    };

    (pruned.kept, diag)
}

/// Prepare one channel for scanning: zero non-finite pixels and rotate the
/// major axis onto the rows.
pub fn prepare_channel(image: ArrayView2<'_, f32>, position_angle: Option<f64>) -> Array2<f32> {
    let clean = zero_non_finite(image);
    match position_angle {
        Some(pa) => rotate_image(clean.view(), pa - 90.0),
        None => clean,
    }
}

/// Extract the near/far emission surface from every channel of a cube.
pub fn detect_surface(cube: &SpectralCube, config: &DetectionConfig) -> Result<SurfaceDetection> {
    detect_surface_with_progress(cube, config, |_| {})
}

/// Surface detection with per-channel progress reporting.
///
/// Calls `on_progress(channels_done)` as each channel is scanned.
pub fn detect_surface_with_progress(
    cube: &SpectralCube,
    config: &DetectionConfig,
    on_progress: impl Fn(usize) + Send + Sync,
) -> Result<SurfaceDetection> {
    if !(config.sigma.is_finite() && config.sigma > 0.0) {
        return Err(DiskSurfError::InvalidParameter(format!(
            "sigma must be positive, got {}",
            config.sigma
        )));
    }
    if config.star_row.is_none() {
        warn!("No stellar row given; near/far pairs are ordered by row only");
    }

    let noise = noise_floor(cube, config.noise_channel);
    let threshold = config.sigma * noise;
    let min_separation = config.min_separation.unwrap_or_else(|| cube.beam_pixels());
    let params = ChannelParams {
        threshold,
        min_separation,
        star_row: config.star_row,
        policy: config.disambiguation,
    };
    info!(
        channels = cube.nv(),
        noise,
        threshold,
        min_separation,
        "Detecting emission surface"
    );

    let done = AtomicUsize::new(0);
    let process = |iv: usize| {
        let image = prepare_channel(cube.data.index_axis(Axis(0), iv), config.position_angle);
        let (points, diagnostics) = detect_channel(image.view(), &params);
        debug!(channel = iv, points = points.len(), "Channel scanned");
        on_progress(done.fetch_add(1, Ordering::Relaxed) + 1);
        let surface = ChannelSurface {
            index: iv,
            velocity: cube.velocity[iv],
            points,
            diagnostics,
        };
        (surface, config.keep_rotated.then_some(image))
    };

    let results: Vec<(ChannelSurface, Option<Array2<f32>>)> =
        if cube.nv() >= PARALLEL_CHANNEL_THRESHOLD {
            (0..cube.nv()).into_par_iter().map(process).collect()
        } else {
            (0..cube.nv()).map(process).collect()
        };

    let mut channels = Vec::with_capacity(results.len());
    let mut rotated = config
        .keep_rotated
        .then(|| Array3::<f32>::zeros(cube.data.dim()));
    for (surface, image) in results {
        if let (Some(stack), Some(image)) = (rotated.as_mut(), image) {
            stack.index_axis_mut(Axis(0), surface.index).assign(&image);
        }
        channels.push(surface);
    }

    let diagnostics = DetectionDiagnostics::accumulate(&channels);
    info!(
        points = diagnostics.points,
        channels_with_points = diagnostics.channels_with_points,
        rejected_by_star = diagnostics.rejected_by_star,
        pruned_by_trend = diagnostics.pruned_by_trend,
        "Surface detection complete"
    );

    Ok(SurfaceDetection {
        channels,
        noise,
        threshold,
        min_separation,
        diagnostics,
        rotated,
    })
}
