use serde::{Deserialize, Serialize};

use crate::brightness::TemperatureScale;
use crate::consts::DEFAULT_SYSTEMIC_WINDOW_KMS;
use crate::error::{DiskSurfError, Result};

/// How the sign of the height above the midplane is settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightConvention {
    /// Measure heights from the star; when nearly every height is negative
    /// the visible surface is the lower one and all heights are negated.
    #[default]
    AutoFlip,
    /// Measure heights from the star and keep their sign as measured.
    FarMinusMidline,
}

impl std::fmt::Display for HeightConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoFlip => write!(f, "Auto-flip"),
            Self::FarMinusMidline => write!(f, "Far minus midline"),
        }
    }
}

/// Disk geometry supplied by the caller. Every field except the distance is
/// required once deprojection runs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiskGeometry {
    /// Inclination in degrees.
    #[serde(default)]
    pub inclination: Option<f64>,
    /// Column of the star in the rotated image.
    #[serde(default)]
    pub star_x: Option<f64>,
    /// Row of the star in the rotated image.
    #[serde(default)]
    pub star_y: Option<f64>,
    /// Systemic velocity in km/s.
    #[serde(default)]
    pub systemic_velocity: Option<f64>,
    /// Distance in pc. When set, lengths are reported in au instead of arcsec.
    #[serde(default)]
    pub distance: Option<f64>,
}

/// Validated geometry with every required value present.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedGeometry {
    pub inclination: f64,
    pub star_x: f64,
    pub star_y: f64,
    pub systemic_velocity: f64,
    pub distance: Option<f64>,
}

impl DiskGeometry {
    pub fn resolve(&self) -> Result<ResolvedGeometry> {
        let inclination = self
            .inclination
            .ok_or(DiskSurfError::MissingParameter("inclination"))?;
        let star_x = self.star_x.ok_or(DiskSurfError::MissingParameter("star_x"))?;
        let star_y = self.star_y.ok_or(DiskSurfError::MissingParameter("star_y"))?;
        let systemic_velocity = self
            .systemic_velocity
            .ok_or(DiskSurfError::MissingParameter("systemic_velocity"))?;

        if !(inclination > 0.0 && inclination < 90.0) {
            return Err(DiskSurfError::InvalidParameter(format!(
                "inclination must lie strictly between 0 and 90 degrees, got {inclination}"
            )));
        }
        if let Some(d) = self.distance {
            if !(d.is_finite() && d > 0.0) {
                return Err(DiskSurfError::InvalidParameter(format!(
                    "distance must be positive, got {d}"
                )));
            }
        }

        Ok(ResolvedGeometry {
            inclination,
            star_x,
            star_y,
            systemic_velocity,
            distance: self.distance,
        })
    }
}

/// Options controlling masking and unit conversion of deprojected points.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeprojectionConfig {
    #[serde(default)]
    pub height_convention: HeightConvention,
    /// Channels closer than this to the systemic velocity (km/s) are dropped.
    #[serde(default = "default_systemic_window")]
    pub systemic_window: f64,
    /// Points beyond this radius (output length unit) are dropped.
    #[serde(default)]
    pub max_radius: Option<f64>,
    /// Drop points whose velocity is still negative after the sign correction.
    #[serde(default = "default_true")]
    pub drop_negative_velocity: bool,
    #[serde(default)]
    pub temperature: TemperatureScale,
}

fn default_systemic_window() -> f64 {
    DEFAULT_SYSTEMIC_WINDOW_KMS
}
fn default_true() -> bool {
    true
}

impl Default for DeprojectionConfig {
    fn default() -> Self {
        Self {
            height_convention: HeightConvention::default(),
            systemic_window: DEFAULT_SYSTEMIC_WINDOW_KMS,
            max_radius: None,
            drop_negative_velocity: true,
            temperature: TemperatureScale::default(),
        }
    }
}
