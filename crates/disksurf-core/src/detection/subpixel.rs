use num_traits::Float;

use crate::consts::DEGENERATE_CURVATURE;

/// A peak position and value refined to sub-pixel accuracy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefinedPeak {
    /// Fractional index of the maximum.
    pub position: f64,
    /// Interpolated value at the maximum.
    pub value: f64,
    /// False when the quadratic was degenerate and the integer peak was kept.
    pub refined: bool,
}

/// Refine the maximum at index `j` with a quadratic through `j-1, j, j+1`.
///
/// The coefficients treat each sample as the mean over its pixel, so the
/// recovered value is the peak of the underlying profile rather than of the
/// samples. Peaks on the profile edge, or a flat / convex triplet, fall back
/// to the integer sample.
pub fn refine_peak_quadratic<T: Float>(profile: &[T], j: usize) -> RefinedPeak {
    let sample = |i: usize| profile[i].to_f64().unwrap_or(f64::NAN);
    let integer = |refined: bool| RefinedPeak {
        position: j as f64,
        value: if j < profile.len() { sample(j) } else { f64::NAN },
        refined,
    };

    if j == 0 || j + 1 >= profile.len() {
        return integer(false);
    }

    let f_minus = sample(j - 1);
    let f_max = sample(j);
    let f_plus = sample(j + 1);

    let a0 = 13.0 * f_max / 12.0 - (f_plus + f_minus) / 24.0;
    let a1 = 0.5 * (f_plus - f_minus);
    let a2 = 0.5 * (f_plus + f_minus - 2.0 * f_max);

    if !(a2 < -DEGENERATE_CURVATURE) {
        return integer(false);
    }

    let position = j as f64 - 0.5 * a1 / a2;
    let value = a0 - 0.25 * a1 * a1 / a2;
    if !(position.is_finite() && value.is_finite()) {
        return integer(false);
    }

    RefinedPeak {
        position,
        value,
        refined: true,
    }
}
