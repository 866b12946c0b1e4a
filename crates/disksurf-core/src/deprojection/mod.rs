pub mod config;
pub mod result;
pub mod solver;

pub use config::{DeprojectionConfig, DiskGeometry, HeightConvention, ResolvedGeometry};
pub use result::{DeprojectedPoint, Deprojection, MaskDiagnostics};
pub use solver::{deproject, deproject_channels, rotation_velocity};
