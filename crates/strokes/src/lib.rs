//! Expected strokes to hole out as a function of distance, per lie, estimated
//! with [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression.
//!
//! Shot records are loaded from CSV ([load_shots]), filtered by the distance range of
//! their lie, averaged over distance bins ([bin_shots]) and smoothed with the
//! [golfgp_gp::fit_predict] regression. Each lie is described by a [LieProfile]
//! holding its filtering and binning rules along with GP hyperparameters.
//!
//! ```no_run
//! use golfgp_strokes::{load_shots, run_lie, Lie, LieProfile};
//!
//! let shots = load_shots("shots_from_fairway.csv").expect("shots loaded");
//! let curve = run_lie(&LieProfile::new(Lie::Fairway), &shots).expect("fairway curve");
//! curve.write_csv("gpr_fairway_preds.csv").expect("predictions saved");
//! ```
//!
//! Several lies can be processed at once with [run_lies] or a [StrokesPipeline],
//! a failing lie does not stop the others.
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod binning;
mod errors;
mod lie;
mod pipeline;
mod shots;

pub use binning::*;
pub use errors::*;
pub use lie::*;
pub use pipeline::*;
pub use shots::*;
