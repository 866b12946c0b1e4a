use crate::consts::MIN_TREND_COLUMNS;

use super::surface::SurfacePoint;

/// Straight line `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least-squares line through `(xs, ys)`.
///
/// Returns `None` with fewer than two points or when all `xs` coincide.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<Line> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / nf;
    let mean_y = ys[..n].iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs[..n].iter().zip(&ys[..n]) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(Line {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Result of pruning a channel's columns against the midline trend.
#[derive(Clone, Debug, Default)]
pub struct TrendPrune {
    pub kept: Vec<SurfacePoint>,
    /// Columns failing the straddle test against the first fit.
    pub first_pass_removed: usize,
    /// Columns failing the straddle test against the refit line.
    pub second_pass_removed: usize,
    /// The channel had too few columns to fit a trend at all.
    pub insufficient: bool,
}

fn midline(points: &[SurfacePoint]) -> Option<Line> {
    let xs: Vec<f64> = points.iter().map(|p| p.column as f64).collect();
    let ys: Vec<f64> = points.iter().map(SurfacePoint::midpoint).collect();
    fit_line(&xs, &ys)
}

fn straddles(point: &SurfacePoint, line: &Line) -> bool {
    let y = line.at(point.column as f64);
    point.y_near < y && point.y_far > y
}

/// Drop columns whose near/far crossings do not straddle the fitted midline.
///
/// A line is fitted to the pair midpoints, columns whose near point lies above
/// it or whose far point lies below it are set aside, and the line is refitted
/// on the survivors. The final straddle test runs on all input columns against
/// the refitted line. Fewer than three columns at either fit empties the channel.
pub fn prune_by_trend(points: &[SurfacePoint]) -> TrendPrune {
    let insufficient = || TrendPrune {
        insufficient: true,
        ..Default::default()
    };

    if points.len() < MIN_TREND_COLUMNS {
        return insufficient();
    }
    let Some(first) = midline(points) else {
        return insufficient();
    };

    let survivors: Vec<SurfacePoint> = points
        .iter()
        .filter(|p| straddles(p, &first))
        .copied()
        .collect();
    let first_pass_removed = points.len() - survivors.len();

    if survivors.len() < MIN_TREND_COLUMNS {
        return TrendPrune {
            first_pass_removed,
            ..insufficient()
        };
    }
    let Some(second) = midline(&survivors) else {
        return TrendPrune {
            first_pass_removed,
            ..insufficient()
        };
    };

    let kept: Vec<SurfacePoint> = points
        .iter()
        .filter(|p| straddles(p, &second))
        .copied()
        .collect();
    let second_pass_removed = points.len() - kept.len();

    TrendPrune {
        kept,
        first_pass_removed,
        second_pass_removed,
        insufficient: false,
    }
}
