use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_NOISE_CHANNEL, DEFAULT_SIGMA};

/// Rule used to decide which two peaks of a column form the near/far pair
/// when the stellar row is known.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisambiguationPolicy {
    /// Take the two strongest peaks. If both sit on the same side of the star,
    /// replace the weaker one with the strongest peak on the other side, or
    /// drop the column when there is none.
    #[default]
    PerSideReplacement,
    /// Sort the two strongest peaks. If the upper one lies below the star,
    /// pair the strongest peak with the strongest peak above the star (or
    /// drop the column). Drop any column whose pair midpoint is below the star.
    StrictStrip,
}

impl std::fmt::Display for DisambiguationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerSideReplacement => write!(f, "Per-side replacement"),
            Self::StrictStrip => write!(f, "Strict strip"),
        }
    }
}

/// Configuration for surface detection across all channels of a cube.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Detection threshold in units of the noise standard deviation.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Disk position angle in degrees (east of north). `None` skips rotation.
    #[serde(default)]
    pub position_angle: Option<f64>,
    /// Row of the star in the rotated image.
    #[serde(default)]
    pub star_row: Option<f64>,
    #[serde(default)]
    pub disambiguation: DisambiguationPolicy,
    /// Channel used to estimate the noise floor.
    #[serde(default = "default_noise_channel")]
    pub noise_channel: usize,
    /// Minimum peak separation in pixels. Defaults to the beam major axis.
    #[serde(default)]
    pub min_separation: Option<f64>,
    /// Keep the rotated channel images in the detection result.
    #[serde(default)]
    pub keep_rotated: bool,
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}
fn default_noise_channel() -> usize {
    DEFAULT_NOISE_CHANNEL
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            position_angle: None,
            star_row: None,
            disambiguation: DisambiguationPolicy::default(),
            noise_channel: DEFAULT_NOISE_CHANNEL,
            min_separation: None,
            keep_rotated: false,
        }
    }
}
