use std::cmp::Ordering;

use num_traits::Float;

/// Find the local maxima of a 1-D profile.
///
/// A maximum is a sample strictly greater than both neighbours, so the first
/// and last samples never qualify. Maxima not exceeding `threshold` are
/// dropped. The rest are sorted by decreasing value, then any maximum within
/// `min_separation` samples of a stronger surviving one is suppressed.
/// A separation of 1 or less disables suppression.
///
/// Returns indices into `profile`, strongest first.
pub fn find_peaks<T: Float>(profile: &[T], threshold: Option<T>, min_separation: f64) -> Vec<usize> {
    let n = profile.len();
    if n < 3 {
        return Vec::new();
    }

    let mut peaks: Vec<usize> = (1..n - 1)
        .filter(|&i| profile[i] > profile[i - 1] && profile[i] > profile[i + 1])
        .filter(|&i| threshold.map_or(true, |t| profile[i] > t))
        .collect();

    peaks.sort_by(|&a, &b| {
        profile[b]
            .partial_cmp(&profile[a])
            .unwrap_or(Ordering::Equal)
    });

    if min_separation <= 1.0 || peaks.len() < 2 {
        return peaks;
    }

    let mut removed = vec![false; peaks.len()];
    for i in 0..peaks.len() {
        if removed[i] {
            continue;
        }
        let kept = peaks[i] as f64;
        for k in i + 1..peaks.len() {
            if (peaks[k] as f64 - kept).abs() <= min_separation {
                removed[k] = true;
            }
        }
    }

    peaks
        .into_iter()
        .zip(removed)
        .filter_map(|(p, r)| (!r).then_some(p))
        .collect()
}
