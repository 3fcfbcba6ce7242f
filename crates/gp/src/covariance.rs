//! Joint prior covariance over training and design points.
//!
//! Given `n` training points and `m` design points, the joint covariance `Sigma` is
//! the `(n + m) x (n + m)` kernel matrix over the concatenation `[xt; design]`.
//! It is partitioned in four blocks:
//!
//! ```text
//!    [ S11 | S12 ]      S11 = Cov(train, train)    (n x n)
//!    [ S21 | S22 ]      S12 = Cov(train, design)   (n x m)
//!                       S21 = Cov(design, train)   (m x n), transpose of S12
//!                       S22 = Cov(design, design)  (m x m)
//! ```

use crate::correlation_models::CorrelationModel;
use linfa::Float;
use ndarray::{concatenate, s, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2, Zip};

/// Kernel matrix over training points followed by design points
#[derive(Debug, Clone)]
pub struct JointCovariance<F: Float> {
    sigma: Array2<F>,
    n_train: usize,
}

impl<F: Float> JointCovariance<F> {
    /// Build the joint covariance of `xt` (n, nx) training points and `design` (m, nx)
    /// points with the given correlation model and length-scale.
    ///
    /// Only the upper triangle is evaluated, rows in parallel, then mirrored
    /// so that the matrix is exactly symmetric.
    ///
    /// *Panics* if `xt` and `design` have not the same number of columns.
    pub fn new<Corr: CorrelationModel<F>>(
        corr: &Corr,
        xt: &ArrayBase<impl Data<Elem = F>, Ix2>,
        design: &ArrayBase<impl Data<Elem = F>, Ix2>,
        length_scale: F,
    ) -> JointCovariance<F> {
        let points = concatenate![Axis(0), xt.view(), design.view()];
        let n_points = points.nrows();

        let mut sigma = Array2::<F>::zeros((n_points, n_points));
        Zip::indexed(sigma.rows_mut()).par_for_each(|i, mut row| {
            let pi = points.row(i);
            for j in i..n_points {
                row[j] = corr.between(&pi, &points.row(j), length_scale);
            }
        });
        for i in 1..n_points {
            for j in 0..i {
                sigma[[i, j]] = sigma[[j, i]];
            }
        }

        JointCovariance {
            sigma,
            n_train: xt.nrows(),
        }
    }

    /// Number of training points
    pub fn n_train(&self) -> usize {
        self.n_train
    }

    /// Number of design points
    pub fn n_design(&self) -> usize {
        self.sigma.nrows() - self.n_train
    }

    /// Full `(n + m) x (n + m)` matrix
    pub fn matrix(&self) -> ArrayView2<F> {
        self.sigma.view()
    }

    /// S11 block: covariance between training points
    pub fn train_train(&self) -> ArrayView2<F> {
        let n = self.n_train;
        self.sigma.slice(s![..n, ..n])
    }

    /// S12 block: covariance between training and design points
    pub fn train_design(&self) -> ArrayView2<F> {
        let n = self.n_train;
        self.sigma.slice(s![..n, n..])
    }

    /// S21 block: covariance between design and training points
    pub fn design_train(&self) -> ArrayView2<F> {
        let n = self.n_train;
        self.sigma.slice(s![n.., ..n])
    }

    /// S22 block: covariance between design points
    pub fn design_design(&self) -> ArrayView2<F> {
        let n = self.n_train;
        self.sigma.slice(s![n.., n..])
    }
}
