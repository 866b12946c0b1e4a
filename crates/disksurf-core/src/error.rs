use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiskSurfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FITS file: {0}")]
    InvalidFits(String),

    #[error("Missing FITS keyword: {0}")]
    MissingKeyword(String),

    #[error("Unsupported BITPIX value: {0}")]
    UnsupportedBitpix(i64),

    #[error("Invalid cube dimensions: {channels}x{height}x{width}")]
    InvalidDimensions {
        channels: usize,
        height: usize,
        width: usize,
    },

    #[error("Channel index {index} out of range (total: {total})")]
    ChannelIndexOutOfRange { index: usize, total: usize },

    #[error("Empty cube")]
    EmptyCube,

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, DiskSurfError>;
