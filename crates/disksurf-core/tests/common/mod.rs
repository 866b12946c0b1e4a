use disksurf_core::cube::{Beam, SpectralCube};
use ndarray::Array2;

pub const PIXELSCALE: f64 = 0.05;
pub const BEAM_FWHM: f64 = 0.1;

/// Sum of Gaussian bumps `(centre, amplitude)` sampled at integer positions.
pub fn gaussian_profile(len: usize, bumps: &[(f64, f64)], width: f64) -> Vec<f32> {
    (0..len)
        .map(|i| {
            bumps
                .iter()
                .map(|&(c, a)| a * (-0.5 * ((i as f64 - c) / width).powi(2)).exp())
                .sum::<f64>() as f32
        })
        .collect()
}

/// Image with two horizontal Gaussian ridges at `near_row` and `far_row`,
/// present only in `columns`.
pub fn two_ridge_image(
    (ny, nx): (usize, usize),
    near_row: f64,
    far_row: f64,
    columns: std::ops::Range<usize>,
    amplitude: f64,
) -> Array2<f32> {
    let profile = gaussian_profile(ny, &[(near_row, amplitude), (far_row, amplitude)], 1.0);
    let mut image = Array2::<f32>::zeros((ny, nx));
    for col in columns {
        for (row, &v) in profile.iter().enumerate() {
            image[[row, col]] = v;
        }
    }
    image
}

/// Cube with the test pixel scale and a circular 2-pixel beam.
pub fn cube_from_channels(channels: &[Array2<f32>], velocity: Vec<f64>) -> SpectralCube {
    SpectralCube::from_channels(channels, velocity, PIXELSCALE, Beam::circular(BEAM_FWHM))
        .expect("valid synthetic cube")
}

/// A flared Keplerian disk seen in the rotated frame (major axis along rows).
#[derive(Clone, Copy, Debug)]
pub struct SyntheticDisk {
    pub size: usize,
    pub star_x: f64,
    pub star_y: f64,
    pub inclination: f64,
    /// h / r of the emitting surface.
    pub flare: f64,
    /// Keplerian constant: v(r) = kepler / sqrt(r), r in pixels, v in km/s.
    pub kepler: f64,
    pub systemic_velocity: f64,
}

impl Default for SyntheticDisk {
    fn default() -> Self {
        Self {
            size: 50,
            star_x: 24.5,
            star_y: 24.5,
            inclination: 45.0,
            flare: 0.3,
            kepler: 7.3,
            systemic_velocity: 5.0,
        }
    }
}

/// One surface crossing pair injected into a channel.
#[derive(Clone, Copy, Debug)]
pub struct InjectedPoint {
    pub column: usize,
    pub r: f64,
    pub h: f64,
    pub y_near: f64,
    pub y_far: f64,
}

impl SyntheticDisk {
    /// Column crossings of the isovelocity curve for a channel offset `delta_v`.
    pub fn crossings(&self, delta_v: f64) -> Vec<InjectedPoint> {
        if delta_v == 0.0 {
            return Vec::new();
        }
        let (sin_i, cos_i) = self.inclination.to_radians().sin_cos();
        let mut points = Vec::new();
        for column in 0..self.size {
            let dx = column as f64 - self.star_x;
            if dx * delta_v <= 0.0 || !(3.0..=20.0).contains(&dx.abs()) {
                continue;
            }
            let r = (dx.abs() * self.kepler * sin_i / delta_v.abs()).powf(2.0 / 3.0);
            if r <= dx.abs() {
                continue;
            }
            let h = self.flare * r;
            let y_c = self.star_y + h * sin_i;
            let dy = (r * r - dx * dx).sqrt() * cos_i;
            let (y_near, y_far) = (y_c - dy, y_c + dy);
            if dy < 2.0 || y_near < 4.0 || y_far > (self.size - 5) as f64 {
                continue;
            }
            points.push(InjectedPoint {
                column,
                r,
                h,
                y_near,
                y_far,
            });
        }
        points
    }

    /// Channel image with unit-amplitude Gaussian ridges at every crossing.
    pub fn channel(&self, delta_v: f64) -> Array2<f32> {
        let mut image = Array2::<f32>::zeros((self.size, self.size));
        for p in self.crossings(delta_v) {
            let profile = gaussian_profile(self.size, &[(p.y_near, 1.0), (p.y_far, 1.0)], 1.0);
            for (row, &v) in profile.iter().enumerate() {
                image[[row, p.column]] = v;
            }
        }
        image
    }

    pub fn velocity_offsets() -> Vec<f64> {
        vec![-1.0, -0.5, 0.0, 0.5, 1.0]
    }

    /// Five-channel cube with channels at systemic + [-1, -0.5, 0, 0.5, 1] km/s.
    pub fn cube(&self) -> SpectralCube {
        let offsets = Self::velocity_offsets();
        let channels: Vec<Array2<f32>> = offsets.iter().map(|&dv| self.channel(dv)).collect();
        let velocity = offsets
            .iter()
            .map(|dv| self.systemic_velocity + dv)
            .collect();
        cube_from_channels(&channels, velocity)
    }
}

/// Least-squares slope of `ys` against `xs`.
pub fn slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let sxx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    sxy / sxx
}

/// Assemble a FITS file from raw `(keyword, value)` cards and big-endian data.
/// Values are written verbatim, so strings must carry their quotes.
pub fn build_fits(cards: &[(&str, &str)], data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    for (key, value) in cards {
        buf.extend_from_slice(format!("{:<8}= {:>20}", key, value).as_bytes());
        buf.resize(buf.len().div_ceil(80) * 80, b' ');
    }
    buf.extend_from_slice(format!("{:<80}", "END").as_bytes());
    buf.resize(buf.len().div_ceil(2880) * 2880, b' ');

    buf.extend_from_slice(data);
    buf.resize(buf.len().div_ceil(2880) * 2880, 0);
    buf
}
