use golfgp_gp::GpError;
use thiserror::Error;

/// A result type for the strokes pipeline
pub type Result<T> = std::result::Result<T, StrokesError>;

/// An error when loading shots or fitting strokes curves
#[derive(Error, Debug)]
pub enum StrokesError {
    /// When the shots CSV cannot be read or a curve cannot be written
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// When a file cannot be opened or created
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// When the GP regression fails
    #[error(transparent)]
    Gp(#[from] GpError),
    /// When no usable data is left for a lie after filtering
    #[error("EmptyLie error: {0}")]
    EmptyLie(String),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
