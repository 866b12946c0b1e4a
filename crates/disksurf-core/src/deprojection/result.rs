use serde::Serialize;

/// One surface point in disk coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DeprojectedPoint {
    /// Channel the point was detected in.
    pub channel: usize,
    /// Column of the rotated image.
    pub column: usize,
    /// Radius (arcsec, or au when a distance is given).
    pub r: f64,
    /// Height above the midplane, same unit as `r`.
    pub h: f64,
    /// Rotation velocity in km/s.
    pub v: f64,
    /// Peak brightness (K, or cube units for the raw scale).
    pub tb: f64,
}

/// How many points each mask removed. Reasons are counted in order, so a
/// point is attributed to the first mask that rejects it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MaskDiagnostics {
    pub total: usize,
    pub negative_height: usize,
    pub undefined_velocity: usize,
    pub beyond_max_radius: usize,
    pub near_systemic: usize,
    pub negative_velocity: usize,
    pub kept: usize,
}

impl MaskDiagnostics {
    /// Points removed by the geometric mask (height, velocity, radius).
    pub fn removed_geometry(&self) -> usize {
        self.negative_height + self.undefined_velocity + self.beyond_max_radius
    }
}

/// Deprojected surface: valid points plus the mask over every input point.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Deprojection {
    pub points: Vec<DeprojectedPoint>,
    /// One entry per detected surface point, in detection order; true = kept.
    pub mask: Vec<bool>,
    /// Heights were negated by the auto-flip convention.
    pub height_flipped: bool,
    /// Velocities were negated because their mean was negative.
    pub velocity_flipped: bool,
    pub diagnostics: MaskDiagnostics,
}

impl Deprojection {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn r(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.r).collect()
    }

    pub fn h(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.h).collect()
    }

    pub fn v(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.v).collect()
    }

    pub fn tb(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.tb).collect()
    }
}
