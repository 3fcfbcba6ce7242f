//! Gaussian process regression of expected strokes to hole out.
//!
//! This crate gathers:
//! * [gp]: a from-scratch GP regression engine with a fixed RBF kernel, computing
//!   posterior means and variances at design points from noisy scalar observations,
//! * [strokes]: a pipeline turning golf shot records into per-lie strokes curves
//!   with the [gp] engine.
//!
//! ```
//! use golfgp::gp::fit_predict;
//! use ndarray::array;
//!
//! let x = array![0.1, 0.4, 0.7];
//! let y = array![1.0, 2.0, 1.5];
//! let posterior = fit_predict(&x, &y, 0.2, 0.01, &x).expect("posterior");
//! let (lower, upper) = posterior.confidence_band(2.);
//! assert!(lower.iter().zip(upper.iter()).all(|(l, u)| l <= u));
//! ```
#![warn(missing_docs)]

pub use golfgp_gp as gp;
pub use golfgp_strokes as strokes;
