/// Default detection threshold, in units of the channel noise standard deviation.
pub const DEFAULT_SIGMA: f64 = 5.0;

/// Channel whose pixel standard deviation sets the noise floor for the whole cube.
pub const DEFAULT_NOISE_CHANNEL: usize = 1;

/// Minimum number of in-surface columns needed to fit the midline trend.
pub const MIN_TREND_COLUMNS: usize = 3;

/// Minimum number of peaks in a column before it can hold a near/far pair.
pub const MIN_COLUMN_PEAKS: usize = 2;

/// Channels closer than this to the systemic velocity (km/s) are dropped.
pub const DEFAULT_SYSTEMIC_WINDOW_KMS: f64 = 0.4;

/// Fraction of negative heights above which the auto-flip convention negates h.
pub const HEIGHT_FLIP_FRACTION: f64 = 0.995;

/// Curvature below which the three-point quadratic is treated as flat.
pub const DEGENERATE_CURVATURE: f64 = 1e-12;

/// Minimum channel count to use channel-level Rayon parallelism.
pub const PARALLEL_CHANNEL_THRESHOLD: usize = 4;

/// FITS logical record size in bytes.
pub const FITS_BLOCK_SIZE: usize = 2880;

/// FITS header card length in bytes.
pub const FITS_CARD_SIZE: usize = 80;

/// Speed of light in m/s.
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;

/// Planck constant in J s.
pub const PLANCK: f64 = 6.626_070_15e-34;

/// Boltzmann constant in J/K.
pub const BOLTZMANN: f64 = 1.380_649e-23;

/// 1 Jy in W m^-2 Hz^-1.
pub const JANSKY: f64 = 1e-26;

/// Arcseconds per radian.
pub const ARCSEC_PER_RADIAN: f64 = 206_264.806_247_096_36;
