use crate::correlation_models::CorrelationModel;
use crate::errors::{GpError, Result};
use linfa::{Float, ParamGuard};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Default length-scale of the correlation model
pub const GP_DEFAULT_LENGTH_SCALE: f64 = 0.1;
/// Default standard deviation of the observation noise
pub const GP_DEFAULT_NOISE_STD: f64 = 0.1;
/// Default upper bound of the estimated condition number of the regularized training covariance
pub const GP_DEFAULT_MAX_CONDITION: f64 = 1e12;
/// Default magnitude under which negative posterior variances are considered rounding noise
pub const GP_DEFAULT_VARIANCE_TOLERANCE: f64 = 1e-10;

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Corr: Serialize",
        deserialize = "F: Deserialize<'de>, Corr: Deserialize<'de>"
    ))
)]
pub struct GpValidParams<F: Float, Corr: CorrelationModel<F>> {
    /// Length-scale (bandwidth) of the correlation model, controls smoothness
    pub(crate) length_scale: F,
    /// Standard deviation of the homoscedastic gaussian observation noise
    pub(crate) noise_std: F,
    /// Correlation model representing the prior covariance k(x, x')
    pub(crate) corr: Corr,
    /// Estimated condition number above which training covariance is deemed singular
    pub(crate) max_condition: F,
    /// Negative variances below `-variance_tolerance` are reported before clamping
    pub(crate) variance_tolerance: F,
}

impl<F: Float, Corr: CorrelationModel<F>> Default for GpValidParams<F, Corr> {
    fn default() -> GpValidParams<F, Corr> {
        GpValidParams {
            length_scale: F::cast(GP_DEFAULT_LENGTH_SCALE),
            noise_std: F::cast(GP_DEFAULT_NOISE_STD),
            corr: Corr::default(),
            max_condition: F::cast(GP_DEFAULT_MAX_CONDITION),
            variance_tolerance: F::cast(GP_DEFAULT_VARIANCE_TOLERANCE),
        }
    }
}

impl<F: Float, Corr: CorrelationModel<F>> GpValidParams<F, Corr> {
    /// Get length-scale
    pub fn length_scale(&self) -> F {
        self.length_scale
    }

    /// Get noise standard deviation
    pub fn noise_std(&self) -> F {
        self.noise_std
    }

    /// Get noise variance added to the training covariance diagonal
    pub fn noise_variance(&self) -> F {
        self.noise_std * self.noise_std
    }

    /// Get correlation corr k(x, x')
    pub fn corr(&self) -> &Corr {
        &self.corr
    }

    /// Get the condition number threshold
    pub fn max_condition(&self) -> F {
        self.max_condition
    }

    /// Get the negative variance tolerance
    pub fn variance_tolerance(&self) -> F {
        self.variance_tolerance
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GP algorithm](struct.GaussianProcess.html).
///
/// Hyperparameters are given by the caller, they are never estimated.
pub struct GpParams<F: Float, Corr: CorrelationModel<F>>(GpValidParams<F, Corr>);

impl<F: Float, Corr: CorrelationModel<F>> GpParams<F, Corr> {
    /// A constructor for GP parameters given the length-scale and noise standard deviation
    pub fn new(length_scale: F, noise_std: F) -> GpParams<F, Corr> {
        Self(GpValidParams {
            length_scale,
            noise_std,
            ..Default::default()
        })
    }

    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &GpValidParams<F, Corr>) -> Self {
        Self(params.clone())
    }

    /// Set correlation model.
    pub fn corr(mut self, corr: Corr) -> Self {
        self.0.corr = corr;
        self
    }

    /// Set length-scale, smaller values give more wiggly predictions.
    pub fn length_scale(mut self, length_scale: F) -> Self {
        self.0.length_scale = length_scale;
        self
    }

    /// Set noise standard deviation `sig`, `sig^2` is added to the training covariance diagonal.
    pub fn noise_std(mut self, noise_std: F) -> Self {
        self.0.noise_std = noise_std;
        self
    }

    /// Set the estimated condition number above which the regularized
    /// training covariance is reported as singular.
    pub fn max_condition(mut self, max_condition: F) -> Self {
        self.0.max_condition = max_condition;
        self
    }

    /// Set the tolerance on negative posterior variances.
    ///
    /// Negative variances are always clamped to zero, values below `-tolerance`
    /// are reported as a warning.
    pub fn variance_tolerance(mut self, tolerance: F) -> Self {
        self.0.variance_tolerance = tolerance;
        self
    }
}

impl<F: Float, Corr: CorrelationModel<F>> From<GpValidParams<F, Corr>> for GpParams<F, Corr> {
    fn from(valid: GpValidParams<F, Corr>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float, Corr: CorrelationModel<F>> ParamGuard for GpParams<F, Corr> {
    type Checked = GpValidParams<F, Corr>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let length_scale = self.0.length_scale;
        if !(length_scale.is_finite() && length_scale > F::zero()) {
            return Err(GpError::InvalidHyperparameter(format!(
                "`length_scale` should be a finite positive value, got {length_scale}"
            )));
        }
        let noise_std = self.0.noise_std;
        if !(noise_std.is_finite() && noise_std >= F::zero()) {
            return Err(GpError::InvalidHyperparameter(format!(
                "`noise_std` should be a finite non-negative value, got {noise_std}"
            )));
        }
        let max_condition = self.0.max_condition;
        if !(max_condition.is_finite() && max_condition > F::one()) {
            return Err(GpError::InvalidHyperparameter(format!(
                "`max_condition` should be a finite value greater than 1, got {max_condition}"
            )));
        }
        let tolerance = self.0.variance_tolerance;
        if !(tolerance.is_finite() && tolerance >= F::zero()) {
            return Err(GpError::InvalidHyperparameter(format!(
                "`variance_tolerance` should be a finite non-negative value, got {tolerance}"
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
