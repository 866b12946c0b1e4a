use std::f64::consts::{LN_2, PI};

use serde::{Deserialize, Serialize};

use crate::consts::{ARCSEC_PER_RADIAN, BOLTZMANN, JANSKY, PLANCK, SPEED_OF_LIGHT};
use crate::cube::{Beam, SpectralCube};
use crate::error::{DiskSurfError, Result};

/// How peak intensities are reported in the deprojected output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureScale {
    /// Inverse Planck law, Jy/beam to K.
    #[default]
    Planck,
    /// Rayleigh-Jeans approximation, Jy/beam to K.
    RayleighJeans,
    /// Keep the cube's native intensity unit.
    Raw,
}

impl std::fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planck => write!(f, "Planck"),
            Self::RayleighJeans => write!(f, "Rayleigh-Jeans"),
            Self::Raw => write!(f, "Raw"),
        }
    }
}

/// Solid angle of a Gaussian beam in steradians.
pub fn beam_solid_angle(beam: &Beam) -> f64 {
    let major = beam.major / ARCSEC_PER_RADIAN;
    let minor = beam.minor / ARCSEC_PER_RADIAN;
    PI * major * minor / (4.0 * LN_2)
}

/// Brightness temperature (K) of a Jy/beam intensity through the inverse Planck law.
///
/// Non-positive intensities have no Planck temperature and map to 0 K.
pub fn planck_temperature(intensity: f64, frequency: f64, beam_area: f64) -> f64 {
    if !(intensity > 0.0) {
        return 0.0;
    }
    let specific = intensity * JANSKY / beam_area;
    let hnu = PLANCK * frequency;
    let x = 2.0 * hnu * frequency * frequency / (SPEED_OF_LIGHT * SPEED_OF_LIGHT * specific);
    hnu / BOLTZMANN / x.ln_1p()
}

/// Brightness temperature (K) of a Jy/beam intensity in the Rayleigh-Jeans limit.
pub fn rayleigh_jeans_temperature(intensity: f64, frequency: f64, beam_area: f64) -> f64 {
    if !(intensity > 0.0) {
        return 0.0;
    }
    let specific = intensity * JANSKY / beam_area;
    SPEED_OF_LIGHT * SPEED_OF_LIGHT * specific / (2.0 * BOLTZMANN * frequency * frequency)
}

/// Intensity to brightness temperature conversion resolved for one cube.
#[derive(Clone, Copy, Debug)]
pub struct BrightnessConverter {
    scale: TemperatureScale,
    frequency: f64,
    beam_area: f64,
}

impl BrightnessConverter {
    pub fn new(scale: TemperatureScale, cube: &SpectralCube) -> Result<Self> {
        let frequency = match scale {
            TemperatureScale::Raw => 0.0,
            _ => cube
                .rest_frequency
                .ok_or(DiskSurfError::MissingParameter("rest frequency"))?,
        };
        Ok(Self {
            scale,
            frequency,
            beam_area: beam_solid_angle(&cube.beam),
        })
    }

    pub fn scale(&self) -> TemperatureScale {
        self.scale
    }

    pub fn convert(&self, intensity: f64) -> f64 {
        match self.scale {
            TemperatureScale::Planck => planck_temperature(intensity, self.frequency, self.beam_area),
            TemperatureScale::RayleighJeans => {
                rayleigh_jeans_temperature(intensity, self.frequency, self.beam_area)
            }
            TemperatureScale::Raw => intensity,
        }
    }
}
