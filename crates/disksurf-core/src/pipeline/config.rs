use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deprojection::{DeprojectionConfig, DiskGeometry};
use crate::detection::DetectionConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input FITS cube.
    pub input: PathBuf,
    /// Output file for the deprojected points.
    pub output: PathBuf,
    /// Optional FITS file receiving the rotated channel images.
    #[serde(default)]
    pub rotated_output: Option<PathBuf>,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub geometry: DiskGeometry,
    #[serde(default)]
    pub deprojection: DeprojectionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("cube.fits"),
            output: PathBuf::from("surface.json"),
            rotated_output: None,
            detection: DetectionConfig::default(),
            geometry: DiskGeometry::default(),
            deprojection: DeprojectionConfig::default(),
        }
    }
}
