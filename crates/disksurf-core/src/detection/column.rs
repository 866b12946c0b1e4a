use crate::consts::MIN_COLUMN_PEAKS;

use super::config::DisambiguationPolicy;

/// What became of one column once its peaks were found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnPair {
    /// Row indices of the near (lower) and far (upper) surface crossings.
    Pair { near: usize, far: usize },
    /// Fewer than two peaks above threshold.
    TooFewPeaks,
    /// The peaks could not be placed consistently around the star.
    RejectedByStar,
}

/// Choose the near/far pair among a column's peaks (strongest first).
pub fn select_pair(
    peaks: &[usize],
    star_row: Option<f64>,
    policy: DisambiguationPolicy,
) -> ColumnPair {
    if peaks.len() < MIN_COLUMN_PEAKS {
        return ColumnPair::TooFewPeaks;
    }
    match (star_row, policy) {
        (None, _) => sorted(peaks[0], peaks[1]),
        (Some(star), DisambiguationPolicy::PerSideReplacement) => per_side_replacement(peaks, star),
        (Some(star), DisambiguationPolicy::StrictStrip) => strict_strip(peaks, star),
    }
}

fn sorted(a: usize, b: usize) -> ColumnPair {
    ColumnPair::Pair {
        near: a.min(b),
        far: a.max(b),
    }
}

fn per_side_replacement(peaks: &[usize], star: f64) -> ColumnPair {
    let strongest = peaks[0];
    let second = peaks[1];
    let below = |p: usize| (p as f64) < star;
    let above = |p: usize| (p as f64) > star;

    if below(strongest) && below(second) {
        match peaks[2..].iter().copied().find(|&p| above(p)) {
            Some(far) => ColumnPair::Pair {
                near: strongest,
                far,
            },
            None => ColumnPair::RejectedByStar,
        }
    } else if above(strongest) && above(second) {
        match peaks[2..].iter().copied().find(|&p| below(p)) {
            Some(near) => ColumnPair::Pair {
                near,
                far: strongest,
            },
            None => ColumnPair::RejectedByStar,
        }
    } else {
        sorted(strongest, second)
    }
}

fn strict_strip(peaks: &[usize], star: f64) -> ColumnPair {
    let (mut near, mut far) = (peaks[0].min(peaks[1]), peaks[0].max(peaks[1]));

    if (far as f64) < star {
        // The far side cannot sit below the star.
        match peaks.iter().copied().find(|&p| (p as f64) > star) {
            Some(p) => {
                far = p;
                near = peaks[0];
            }
            None => return ColumnPair::RejectedByStar,
        }
    }

    if (near + far) as f64 / 2.0 < star {
        return ColumnPair::RejectedByStar;
    }

    ColumnPair::Pair { near, far }
}
