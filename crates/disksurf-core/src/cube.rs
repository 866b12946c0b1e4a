use std::path::PathBuf;

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::error::{DiskSurfError, Result};

/// Synthesized beam of the observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Beam {
    /// FWHM of the major axis in arcsec.
    pub major: f64,
    /// FWHM of the minor axis in arcsec.
    pub minor: f64,
    /// Position angle of the major axis in degrees.
    pub angle: f64,
}

impl Beam {
    pub fn circular(fwhm: f64) -> Self {
        Self {
            major: fwhm,
            minor: fwhm,
            angle: 0.0,
        }
    }
}

/// A spectral line data cube: one 2-D intensity image per velocity channel.
#[derive(Clone, Debug)]
pub struct SpectralCube {
    /// Intensity, shape = (channels, rows, columns).
    pub data: Array3<f32>,
    /// Velocity of each channel in km/s.
    pub velocity: Vec<f64>,
    /// Pixel size in arcsec.
    pub pixelscale: f64,
    pub beam: Beam,
    /// Rest frequency of the line in Hz, if known.
    pub rest_frequency: Option<f64>,
    /// Intensity unit as stored in the source file (e.g. "Jy/beam").
    pub unit: Option<String>,
}

impl SpectralCube {
    pub fn new(data: Array3<f32>, velocity: Vec<f64>, pixelscale: f64, beam: Beam) -> Result<Self> {
        let (nv, ny, nx) = data.dim();
        if nv == 0 {
            return Err(DiskSurfError::EmptyCube);
        }
        if ny < 3 || nx == 0 {
            return Err(DiskSurfError::InvalidDimensions {
                channels: nv,
                height: ny,
                width: nx,
            });
        }
        if velocity.len() != nv {
            return Err(DiskSurfError::InvalidParameter(format!(
                "velocity axis has {} values for {} channels",
                velocity.len(),
                nv
            )));
        }
        if !(pixelscale.is_finite() && pixelscale > 0.0) {
            return Err(DiskSurfError::InvalidParameter(format!(
                "pixel scale must be positive, got {pixelscale}"
            )));
        }
        if !(beam.major.is_finite() && beam.major > 0.0) {
            return Err(DiskSurfError::InvalidParameter(format!(
                "beam major axis must be positive, got {}",
                beam.major
            )));
        }

        Ok(Self {
            data,
            velocity,
            pixelscale,
            beam,
            rest_frequency: None,
            unit: None,
        })
    }

    /// Build a cube from a list of equal-shaped channel images.
    pub fn from_channels(
        channels: &[Array2<f32>],
        velocity: Vec<f64>,
        pixelscale: f64,
        beam: Beam,
    ) -> Result<Self> {
        let first = channels.first().ok_or(DiskSurfError::EmptyCube)?;
        let (ny, nx) = first.dim();
        let mut data = Array3::<f32>::zeros((channels.len(), ny, nx));
        for (iv, channel) in channels.iter().enumerate() {
            if channel.dim() != (ny, nx) {
                let (h, w) = channel.dim();
                return Err(DiskSurfError::InvalidDimensions {
                    channels: channels.len(),
                    height: h,
                    width: w,
                });
            }
            data.index_axis_mut(Axis(0), iv).assign(channel);
        }
        Self::new(data, velocity, pixelscale, beam)
    }

    pub fn with_rest_frequency(mut self, frequency: f64) -> Self {
        self.rest_frequency = Some(frequency);
        self
    }

    pub fn nv(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn ny(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn nx(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    pub fn channel(&self, index: usize) -> Result<ArrayView2<'_, f32>> {
        if index >= self.nv() {
            return Err(DiskSurfError::ChannelIndexOutOfRange {
                index,
                total: self.nv(),
            });
        }
        Ok(self.data.index_axis(Axis(0), index))
    }

    /// Beam major axis in pixels: the minimum separation between two peaks.
    pub fn beam_pixels(&self) -> f64 {
        self.beam.major / self.pixelscale
    }
}

/// Descriptive metadata about a cube file.
#[derive(Clone, Debug)]
pub struct CubeInfo {
    pub filename: PathBuf,
    pub channels: usize,
    pub width: usize,
    pub height: usize,
    pub bitpix: i64,
    pub pixelscale: f64,
    pub beam: Beam,
    pub velocity_range: (f64, f64),
    pub rest_frequency: Option<f64>,
    pub unit: Option<String>,
    pub object: Option<String>,
}
