use thiserror::Error;

/// A result type for GP regression algorithm
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when using [`GaussianProcess`](crate::GaussianProcess) or [`fit_predict`](crate::fit_predict)
#[derive(Error, Debug)]
pub enum GpError {
    /// When length-scale, noise or a numerical setting is out of its domain
    #[error("InvalidHyperparameter error: {0}")]
    InvalidHyperparameter(String),
    /// When inputs, outputs or design points have incompatible shapes
    #[error("ShapeMismatch error: {0}")]
    ShapeMismatch(String),
    /// When the regularized training covariance cannot be factorized reliably
    #[error("SingularSystem error: {0}")]
    SingularSystem(String),
    /// When NaN or infinite values show up in inputs or intermediate results
    #[error("NonFiniteInput error: {0}")]
    NonFiniteInput(String),
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
    /// When error during saving
    #[cfg(feature = "persistent")]
    #[error("Save error: {0}")]
    SaveError(#[from] serde_json::Error),
    /// When error during loading
    #[cfg(feature = "persistent")]
    #[error("Load IO error")]
    LoadIoError(#[from] std::io::Error),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
