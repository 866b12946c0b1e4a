pub mod column;
pub mod config;
pub mod noise;
pub mod peaks;
pub mod subpixel;
pub mod surface;
pub mod trend;

pub use config::{DetectionConfig, DisambiguationPolicy};
pub use peaks::find_peaks;
pub use subpixel::{refine_peak_quadratic, RefinedPeak};
pub use surface::{
    detect_channel, detect_surface, detect_surface_with_progress, ChannelDiagnostics,
    ChannelParams, ChannelSurface, DetectionDiagnostics, SurfaceDetection, SurfacePoint,
};
