use ndarray::ArrayView2;

use crate::cube::SpectralCube;

/// Mean and standard deviation of the finite pixels of an image.
pub fn compute_mean_stddev(data: ArrayView2<'_, f32>) -> (f64, f64) {
    let mut n = 0usize;
    let mut sum = 0.0_f64;
    for &v in data.iter().filter(|v| v.is_finite()) {
        sum += v as f64;
        n += 1;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / n as f64;
    let var = data
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    (mean, var.sqrt())
}

/// Noise floor of the cube: pixel standard deviation of one reference channel.
///
/// The channel index is clamped to the last channel of the cube.
pub fn noise_floor(cube: &SpectralCube, channel: usize) -> f64 {
    let index = channel.min(cube.nv() - 1);
    match cube.channel(index) {
        Ok(image) => compute_mean_stddev(image).1,
        Err(_) => 0.0,
    }
}
