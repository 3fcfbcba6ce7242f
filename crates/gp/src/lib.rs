//! This library implements [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression
//! of scalar observations with fixed, caller-supplied hyperparameters.
//!
//! The prior covariance is given by an isotropic correlation model, the RBF
//! (squared exponential) kernel `k(a, b) = exp(-|a - b|^2 / (2 * lam^2))` by default,
//! and observations are corrupted by i.i.d. gaussian noise of standard deviation `sig`.
//! Posterior means and variances at design points are obtained by closed-form
//! gaussian conditioning on the joint covariance of training and design points,
//! using a Cholesky factorization of the regularized training covariance.
//!
//! The one-shot entry point is [fit_predict] for 1D inputs. Reusable models are
//! implemented by [GaussianProcess] parameterized by [GpParams] (see [Gpr] for
//! the RBF flavour), following the linfa `Fit`/`Predict` conventions.
//!
//! Hyperparameters are never estimated: [GaussianProcess::likelihood] and the
//! [metrics] module help comparing hand-picked values.
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
pub mod correlation_models;
mod covariance;
mod errors;
pub mod metrics;

mod parameters;
mod utils;

pub use algorithm::*;
pub use covariance::JointCovariance;
pub use errors::*;
pub use parameters::*;
pub use utils::design_grid;
