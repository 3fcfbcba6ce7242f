//! A module for correlation models used as the prior covariance of the GP model.
//!
//! Correlation models are stationary and isotropic: the correlation between two
//! points only depends on their squared euclidean distance and a length-scale.
//!
//! The following correlation models are implemented:
//! * squared exponential (a.k.a. RBF or gaussian kernel).

use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{ArrayBase, Data, Ix1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// A trait for using a correlation model in GP regression
pub trait CorrelationModel<F: Float>: Clone + Copy + Default + fmt::Display + Sync {
    /// Compute correlation value given the squared euclidean distance `sq_dist`
    /// between two points and a positive `length_scale`.
    fn value(&self, sq_dist: F, length_scale: F) -> F;

    /// Compute correlation `k(a, b)` between two points of the same dimension.
    ///
    /// *Panics* if `a` and `b` have not the same length.
    fn between(
        &self,
        a: &ArrayBase<impl Data<Elem = F>, Ix1>,
        b: &ArrayBase<impl Data<Elem = F>, Ix1>,
        length_scale: F,
    ) -> F {
        assert!(a.len() == b.len());
        let sq_dist = a.iter().zip(b.iter()).fold(F::zero(), |acc, (&ai, &bi)| {
            let d = ai - bi;
            acc + d * d
        });
        self.value(sq_dist, length_scale)
    }
}

/// Squared exponential correlation models
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub struct SquaredExponentialCorr();

impl From<SquaredExponentialCorr> for String {
    fn from(_item: SquaredExponentialCorr) -> String {
        "SquaredExponential".to_string()
    }
}

impl TryFrom<String> for SquaredExponentialCorr {
    type Error = &'static str;
    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s == "SquaredExponential" {
            Ok(Self::default())
        } else {
            Err("Bad string value for SquaredExponentialCorr, should be \'SquaredExponential\'")
        }
    }
}

impl<F: Float> CorrelationModel<F> for SquaredExponentialCorr {
    /// exp( - |a - b|^2 / (2 * lambda^2) )
    fn value(&self, sq_dist: F, length_scale: F) -> F {
        if sq_dist == F::zero() {
            return F::one();
        }
        // lambda^2 underflows for tiny length-scales: divide twice instead
        let scaled = sq_dist / length_scale / length_scale;
        F::exp(-scaled / F::cast(2.))
    }
}

impl fmt::Display for SquaredExponentialCorr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SquaredExponential")
    }
}

/// RBF kernel value `exp(-|a - b|^2 / (2 * length_scale^2))` between two points.
///
/// Scalar inputs are given as length-1 arrays. Returns an error when `length_scale`
/// is not a finite positive value or when `a` and `b` lengths differ.
pub fn rbf_kernel<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    length_scale: F,
) -> Result<F> {
    if !(length_scale.is_finite() && length_scale > F::zero()) {
        return Err(GpError::InvalidHyperparameter(format!(
            "length scale should be a finite positive value, got {length_scale}"
        )));
    }
    if a.len() != b.len() {
        return Err(GpError::ShapeMismatch(format!(
            "kernel inputs should have the same dimension, got {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(SquaredExponentialCorr::default().between(a, b, length_scale))
}
