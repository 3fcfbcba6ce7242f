use crate::correlation_models::{CorrelationModel, SquaredExponentialCorr};
use crate::covariance::JointCovariance;
use crate::errors::{GpError, Result};
use crate::parameters::{GpParams, GpValidParams};
use crate::utils::{check_finite, has_duplicate_rows};

use linfa::prelude::{DatasetBase, Fit, Float, PredictInplace};
use linfa::ParamGuard;
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix1, Ix2};

use log::{debug, warn};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Posterior distribution of the GP at a set of design points.
///
/// `mean[i]` and `variance[i]` are the posterior mean and variance at `design[i]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct Posterior<F: Float> {
    mean: Array1<F>,
    variance: Array1<F>,
}

impl<F: Float> Posterior<F> {
    fn empty() -> Posterior<F> {
        Posterior {
            mean: Array1::zeros(0),
            variance: Array1::zeros(0),
        }
    }

    /// Posterior means, one per design point
    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    /// Posterior variances, one per design point
    pub fn variance(&self) -> &Array1<F> {
        &self.variance
    }

    /// Posterior standard deviations, one per design point
    pub fn std_dev(&self) -> Array1<F> {
        self.variance.mapv(|v| v.sqrt())
    }

    /// Lower and upper bounds `mean -/+ k * std` of the uncertainty band
    /// (`k = 2` gives the usual ~95% band).
    pub fn confidence_band(&self, k: F) -> (Array1<F>, Array1<F>) {
        let half_width = self.std_dev().mapv(|s| k * s);
        (&self.mean - &half_width, &self.mean + &half_width)
    }

    /// Number of design points
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the posterior was computed at no design point
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Consume the posterior and return `(mean, variance)`
    pub fn into_parts(self) -> (Array1<F>, Array1<F>) {
        (self.mean, self.variance)
    }
}

#[cfg(feature = "persistent")]
impl Posterior<f64> {
    /// Save posterior in a json file at `path`
    pub fn save(&self, path: &str) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        serde_json::to_writer(&mut file, self)?;
        Ok(())
    }

    /// Load a posterior previously saved with [`Posterior::save`]
    pub fn load(path: &str) -> Result<Posterior<f64>> {
        let data = std::fs::read(path)?;
        let posterior = serde_json::from_slice(&data)?;
        Ok(posterior)
    }
}

/// A GP regression where the outputs are modeled by a zero-mean Gaussian process
/// with a fixed correlation kernel and i.i.d. gaussian observation noise:
///
/// `y(x) = Z(x) + e`
///
/// where:
/// * `Z(x)` is a gaussian process with prior covariance `k(x, x')`,
///   an RBF kernel with length-scale `lam` by default,
/// * `e ~ Normal(0, sig^2)` is the observation noise.
///
/// Given training points `xt` and design points `x`, predictions are obtained
/// by closed-form gaussian conditioning on the joint covariance (see [`JointCovariance`]):
///
/// `mean = S21 (S11 + sig^2 I)^-1 yt`
///
/// `cov  = S22 - S21 (S11 + sig^2 I)^-1 S12`
///
/// # Implementation
///
/// * Based on [ndarray](https://github.com/rust-ndarray/ndarray)
///   and [linfa](https://github.com/rust-ml/linfa)
/// * The regularized training covariance is factorized once with Cholesky at fit time,
///   no explicit inverse is ever formed.
/// * Hyperparameters `lam` and `sig` are given, not estimated.
///
/// # Example
///
/// ```no_run
/// use golfgp_gp::Gpr;
/// use linfa::prelude::*;
/// use ndarray::{array, Array, Axis};
///
/// let xt = array![[0.1], [0.4], [0.7]];
/// let yt = array![1.0, 2.0, 1.5];
///
/// let gp = Gpr::params(0.2, 0.01)
///     .fit(&Dataset::new(xt, yt))
///     .expect("GP fitted");
///
/// let design = Array::linspace(0., 1., 11).insert_axis(Axis(1));
/// let posterior = gp.predict_valvar(&design).expect("GP prediction");
/// let (lower, upper) = posterior.confidence_band(2.);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Corr: Serialize",
        deserialize = "F: Deserialize<'de>, Corr: Deserialize<'de>"
    ))
)]
pub struct GaussianProcess<F: Float, Corr: CorrelationModel<F>> {
    /// Lower Cholesky factor L of the regularized training covariance S11 + sig^2 I
    r_chol: Array2<F>,
    /// Log marginal likelihood of the training outputs
    likelihood: F,
    /// Training dataset (input, output)
    pub(crate) training_data: (Array2<F>, Array1<F>),
    /// Parameters used to fit this model
    pub(crate) params: GpValidParams<F, Corr>,
}

/// GP regression with the RBF (squared exponential) correlation model
pub type Gpr<F> = GpParams<F, SquaredExponentialCorr>;

impl<F: Float> Gpr<F> {
    /// RBF GP parameters constructor
    pub fn params(length_scale: F, noise_std: F) -> GpParams<F, SquaredExponentialCorr> {
        GpParams::new(length_scale, noise_std)
    }
}

impl<F: Float, Corr: CorrelationModel<F>> fmt::Display for GaussianProcess<F, Corr> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(corr={}, length_scale={}, noise_std={}, likelihood={})",
            self.params.corr,
            self.params.length_scale,
            self.params.noise_std,
            self.likelihood,
        )
    }
}

impl<F: Float, Corr: CorrelationModel<F>> GaussianProcess<F, Corr> {
    /// Gp parameters contructor
    pub fn params<NewCorr: CorrelationModel<F>>(
        length_scale: F,
        noise_std: F,
    ) -> GpParams<F, NewCorr> {
        GpParams::new(length_scale, noise_std)
    }

    /// Predict posterior means at m given `x` points of nx components specified as a (m, nx) matrix.
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        Ok(self.predict_valvar(x)?.mean)
    }

    /// Predict posterior variances at m given `x` points of nx components specified as a (m, nx) matrix.
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        Ok(self.predict_valvar(x)?.variance)
    }

    /// Predict both posterior means and variances at m given `x` points
    pub fn predict_valvar(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Posterior<F>> {
        let (xt, yt) = &self.training_data;
        check_design(x, xt.ncols())?;
        let joint = JointCovariance::new(&self.params.corr, xt, x, self.params.length_scale);
        condition(&self.r_chol, yt, &joint, self.params.variance_tolerance)
    }

    /// Log marginal likelihood `log p(yt | xt)` of the training outputs under
    /// the fitted hyperparameters. Can be used to compare hand-picked hyperparameters.
    pub fn likelihood(&self) -> F {
        self.likelihood
    }

    /// Length-scale used by the correlation model
    pub fn length_scale(&self) -> F {
        self.params.length_scale
    }

    /// Noise standard deviation
    pub fn noise_std(&self) -> F {
        self.params.noise_std
    }

    /// Retrieve number of training points and input dimension
    pub fn dims(&self) -> (usize, usize) {
        (self.training_data.0.nrows(), self.training_data.0.ncols())
    }

    /// Training dataset (input, output)
    pub fn training_data(&self) -> &(Array2<F>, Array1<F>) {
        &self.training_data
    }
}

impl<F, D, Corr> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for GaussianProcess<F, Corr>
where
    F: Float,
    D: Data<Elem = F>,
    Corr: CorrelationModel<F>,
{
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        let values = self.predict(x).expect("GP Prediction");
        *y = values;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros((x.nrows(),))
    }
}

impl<F: Float, Corr: CorrelationModel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GpValidParams<F, Corr>
{
    type Object = GaussianProcess<F, Corr>;

    /// Factorize the regularized training covariance
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.targets();
        check_training(x, y, self.noise_std)?;

        let design = Array2::zeros((0, x.ncols()));
        let joint = JointCovariance::new(&self.corr, x, &design, self.length_scale);
        let r_chol = factorize(&joint.train_train(), self.noise_variance(), self.max_condition)?;
        let likelihood = log_likelihood(&r_chol, y)?;
        debug!(
            "GP fitted on {} points, log likelihood = {}",
            x.nrows(),
            likelihood
        );

        Ok(GaussianProcess {
            r_chol,
            likelihood,
            training_data: (x.to_owned(), y.to_owned()),
            params: self.clone(),
        })
    }
}

impl<F: Float, Corr: CorrelationModel<F>> GpValidParams<F, Corr> {
    /// Compute the posterior at `design` (m, nx) points given training
    /// inputs `x` (n, nx) and outputs `y` (n,) in a single pass over the
    /// joint covariance of training and design points.
    pub fn fit_predict(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        design: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<Posterior<F>> {
        check_training(x, y, self.noise_std)?;
        check_design(design, x.ncols())?;

        let now = Instant::now();
        let joint = JointCovariance::new(&self.corr, x, design, self.length_scale);
        debug!(
            "joint covariance ({} training + {} design points) built in {:?}",
            joint.n_train(),
            joint.n_design(),
            now.elapsed()
        );
        let r_chol = factorize(&joint.train_train(), self.noise_variance(), self.max_condition)?;
        let posterior = condition(&r_chol, y, &joint, self.variance_tolerance)?;
        debug!("elapsed fit_predict = {:?}", now.elapsed());
        Ok(posterior)
    }
}

/// Gaussian process regression with RBF kernel of scalar observations.
///
/// Given `n` training inputs `x` with outputs `y`, a length-scale `length_scale`
/// and a noise standard deviation `noise_std`, returns the posterior
/// mean and variance at each of the `m` `design` points, in `design` order.
///
/// ```
/// use golfgp_gp::fit_predict;
/// use ndarray::array;
///
/// let x = array![0.1, 0.4, 0.7];
/// let y = array![1.0, 2.0, 1.5];
/// let posterior = fit_predict(&x, &y, 0.2, 0.01, &x).expect("posterior");
/// assert_eq!(posterior.len(), 3);
/// ```
pub fn fit_predict<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    length_scale: F,
    noise_std: F,
    design: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<Posterior<F>> {
    Gpr::params(length_scale, noise_std).check()?.fit_predict(
        &x.view().insert_axis(Axis(1)),
        y,
        &design.view().insert_axis(Axis(1)),
    )
}

/// Check training inputs `x` (n, nx) against outputs `y` (n,)
fn check_training<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    noise_std: F,
) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(GpError::ShapeMismatch(format!(
            "training inputs and outputs should have the same length, got {} and {}",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 {
        return Err(GpError::ShapeMismatch(
            "training set should contain at least one point".to_string(),
        ));
    }
    check_finite(x, "training inputs")?;
    check_finite(y, "training outputs")?;
    if has_duplicate_rows(x) {
        warn!("multiple training inputs have the same value (at least same row twice)");
        if noise_std == F::zero() {
            warn!("duplicated training inputs without noise make the training covariance singular");
        }
    }
    Ok(())
}

/// Check design points `x` (m, nx) against the training input dimension
fn check_design<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>, dim: usize) -> Result<()> {
    if x.ncols() != dim {
        return Err(GpError::ShapeMismatch(format!(
            "design points should have {} components, got {}",
            dim,
            x.ncols()
        )));
    }
    check_finite(x, "design points")
}

/// Cholesky factor L of the regularized training covariance `S11 + noise_variance * I`.
///
/// The condition number is estimated from the factor diagonal as `(max(L_ii) / min(L_ii))^2`,
/// a lower bound of the actual condition number.
fn factorize<F: Float>(s11: &ArrayView2<F>, noise_variance: F, max_condition: F) -> Result<Array2<F>> {
    let mut s11_reg = s11.to_owned();
    s11_reg.diag_mut().mapv_inplace(|v| v + noise_variance);

    let r_chol = s11_reg.cholesky().map_err(|e| {
        GpError::SingularSystem(format!(
            "regularized training covariance is not positive definite ({e})"
        ))
    })?;

    let diag = r_chol.diag();
    if diag.iter().any(|v| !v.is_finite() || *v <= F::zero()) {
        return Err(GpError::SingularSystem(
            "regularized training covariance is singular, \
            check duplicated training inputs or increase noise"
                .to_string(),
        ));
    }
    let (lower, upper) = diag.fold((F::infinity(), F::zero()), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    let ratio = upper / lower;
    let condition = ratio * ratio;
    if condition > max_condition {
        return Err(GpError::SingularSystem(format!(
            "regularized training covariance is ill-conditioned \
            (estimated condition number {condition:e} > {max_condition:e})"
        )));
    }
    debug!("training covariance factorized, estimated condition number = {condition:e}");
    Ok(r_chol)
}

/// Log marginal likelihood `-1/2 yt' (S11 + sig^2 I)^-1 yt - sum(log L_ii) - n/2 log(2 pi)`
fn log_likelihood<F: Float>(
    r_chol: &Array2<F>,
    yt: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<F> {
    let n_obs = F::cast(yt.len());
    let ly = r_chol.solve_triangular(&yt.to_owned().insert_axis(Axis(1)), UPLO::Lower)?;
    let data_fit = ly.mapv(|v| v * v).sum();
    let logdet = r_chol.diag().mapv(|v| v.ln()).sum();
    let two_pi = F::cast(2. * std::f64::consts::PI);
    Ok(F::cast(-0.5) * data_fit - logdet - F::cast(0.5) * n_obs * two_pi.ln())
}

/// Closed-form gaussian conditioning of the design block on training outputs `yt`
/// given the Cholesky factor `r_chol` of the regularized S11 block of `joint`.
fn condition<F: Float>(
    r_chol: &Array2<F>,
    yt: &ArrayBase<impl Data<Elem = F>, Ix1>,
    joint: &JointCovariance<F>,
    variance_tolerance: F,
) -> Result<Posterior<F>> {
    if joint.n_design() == 0 {
        return Ok(Posterior::empty());
    }
    let s12 = joint.train_design();
    let s21 = joint.design_train();
    let s22 = joint.design_design();

    // (S11 + sig^2 I)^-1 S12 = L^-T L^-1 S12, so that gain K = S21 (S11 + sig^2 I)^-1 = w^T
    let rt = r_chol.solve_triangular(&s12, UPLO::Lower)?;
    let w = r_chol.t().solve_triangular_into(rt, UPLO::Upper)?;

    let mean = w.t().dot(yt);
    let cov = &s22 - &s21.dot(&w);
    let variance = cov.diag().to_owned();

    check_finite(&mean, "posterior means")?;
    check_finite(&variance, "posterior variances")?;

    let n_neg = variance.iter().filter(|&&v| v < -variance_tolerance).count();
    if n_neg > 0 {
        warn!(
            "{} posterior variances below -{} clamped to zero, training covariance may be ill-conditioned",
            n_neg, variance_tolerance
        );
    }
    // Variance might be slightly negative depending on
    // machine precision: set to zero in that case
    let variance = variance.mapv(|v| if v < F::zero() { F::zero() } else { v });

    Ok(Posterior { mean, variance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linfa::prelude::{Dataset, Predict};
    use ndarray::{array, Array, Array1};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::{Normal, Uniform};
    use ndarray_rand::RandomExt;
    use paste::paste;
    use rand_xoshiro::Xoshiro256Plus;

    fn computer_simulator(x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|v| (v + 0.1).ln() + (5. * std::f64::consts::PI * v).sin())
    }

    /// Posterior computed with explicit inversion of the regularized training covariance
    fn explicit_inverse_posterior(
        x: &Array1<f64>,
        y: &Array1<f64>,
        lam: f64,
        sig: f64,
        design: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let joint = JointCovariance::new(
            &SquaredExponentialCorr::default(),
            &x.view().insert_axis(Axis(1)),
            &design.view().insert_axis(Axis(1)),
            lam,
        );
        let mut s11 = joint.train_train().to_owned();
        s11.diag_mut().mapv_inplace(|v| v + sig * sig);
        // Gauss-Jordan inverse
        let n = s11.nrows();
        let mut aug = Array2::<f64>::zeros((n, 2 * n));
        aug.slice_mut(ndarray::s![.., ..n]).assign(&s11);
        aug.slice_mut(ndarray::s![.., n..]).assign(&Array2::eye(n));
        for i in 0..n {
            let pivot = aug[[i, i]];
            aug.row_mut(i).mapv_inplace(|v| v / pivot);
            for k in 0..n {
                if k != i {
                    let factor = aug[[k, i]];
                    let row_i = aug.row(i).to_owned();
                    aug.row_mut(k).scaled_add(-factor, &row_i);
                }
            }
        }
        let inv = aug.slice(ndarray::s![.., n..]).to_owned();
        let gain = joint.design_train().dot(&inv);
        let mean = gain.dot(y);
        let cov = &joint.design_design() - &gain.dot(&joint.train_design());
        (mean, cov.diag().to_owned())
    }

    #[test]
    fn test_end_to_end_recovery_at_training_points() {
        let x = array![0.1, 0.4, 0.7];
        let y = array![1.0, 2.0, 1.5];
        let posterior = fit_predict(&x, &y, 0.2, 0.01, &x).expect("posterior");

        assert_eq!(posterior.len(), 3);
        assert_abs_diff_eq!(*posterior.mean(), y, epsilon = 1e-2);
        for &v in posterior.variance().iter() {
            assert!(v > 0.);
            assert!(v < 1e-3);
        }
    }

    #[test]
    fn test_matches_explicit_inverse() {
        let x = array![0.05, 0.2, 0.35, 0.5, 0.8, 0.95];
        let y = computer_simulator(&x);
        let design = Array::linspace(0., 1., 21);
        let posterior = fit_predict(&x, &y, 0.1, 0.1, &design).expect("posterior");
        let (mean, variance) = explicit_inverse_posterior(&x, &y, 0.1, 0.1, &design);
        assert_abs_diff_eq!(*posterior.mean(), mean, epsilon = 1e-9);
        assert_abs_diff_eq!(*posterior.variance(), variance, epsilon = 1e-9);
    }

    macro_rules! test_interpolation {
        ($name:ident, $lam:expr) => {
            paste! {
                #[test]
                fn [<test_noiseless_interpolation_ $name>]() {
                    let x = array![0., 1., 2., 3., 4.];
                    let y = array![0.0, 1.0, 1.5, 0.9, 1.0];
                    let design = array![3., 1., 2.5];
                    let posterior = fit_predict(&x, &y, $lam, 0., &design).expect("posterior");
                    assert_abs_diff_eq!(posterior.mean()[0], 0.9, epsilon = 1e-8);
                    assert_abs_diff_eq!(posterior.mean()[1], 1.0, epsilon = 1e-8);
                    assert_abs_diff_eq!(posterior.variance()[0], 0., epsilon = 1e-8);
                    assert_abs_diff_eq!(posterior.variance()[1], 0., epsilon = 1e-8);
                    assert!(posterior.variance()[2] > 1e-6);
                    assert!(posterior.variance().iter().all(|&v| v >= 0.));
                }
            }
        };
    }

    test_interpolation!(narrow, 0.3);
    test_interpolation!(medium, 0.5);
    test_interpolation!(wide, 0.8);

    #[test]
    fn test_shrinkage_far_from_data() {
        let x = array![0.1, 0.4, 0.7];
        let y = array![1.0, 2.0, 1.5];
        let design = array![0.4, 50., -100.];
        let posterior = fit_predict(&x, &y, 0.2, 0.05, &design).expect("posterior");
        assert_abs_diff_eq!(posterior.mean()[1], 0., epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.mean()[2], 0., epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.variance()[1], 1., epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.variance()[2], 1., epsilon = 1e-12);
        assert!(posterior.variance()[0] < 0.01);
    }

    #[test]
    fn test_order_preservation() {
        let x = array![0.1, 0.3, 0.45, 0.9];
        let y = array![0.2, -0.4, 0.8, 1.1];
        let design = array![0.0, 0.2, 0.5, 0.75, 1.0];
        let permutation = [3, 0, 4, 1, 2];
        let permuted = Array1::from_iter(permutation.iter().map(|&i| design[i]));

        let posterior = fit_predict(&x, &y, 0.25, 0.1, &design).expect("posterior");
        let permuted_posterior = fit_predict(&x, &y, 0.25, 0.1, &permuted).expect("posterior");
        for (k, &i) in permutation.iter().enumerate() {
            assert_abs_diff_eq!(
                permuted_posterior.mean()[k],
                posterior.mean()[i],
                epsilon = 1e-12
            );
            assert_abs_diff_eq!(
                permuted_posterior.variance()[k],
                posterior.variance()[i],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_training_order_does_not_matter() {
        let x = array![0.1, 0.3, 0.45, 0.9];
        let y = array![0.2, -0.4, 0.8, 1.1];
        let xr = array![0.9, 0.45, 0.1, 0.3];
        let yr = array![1.1, 0.8, 0.2, -0.4];
        let design = Array::linspace(0., 1., 11);
        let p = fit_predict(&x, &y, 0.25, 0.1, &design).expect("posterior");
        let pr = fit_predict(&xr, &yr, 0.25, 0.1, &design).expect("posterior");
        assert_abs_diff_eq!(*p.mean(), *pr.mean(), epsilon = 1e-10);
        assert_abs_diff_eq!(*p.variance(), *pr.variance(), epsilon = 1e-10);
    }

    #[test]
    fn test_determinism() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let x = Array1::random_using(30, Uniform::new(0., 1.), &mut rng);
        let y = computer_simulator(&x);
        let design = Array::linspace(0., 1., 101);
        let p1 = fit_predict(&x, &y, 0.1, 0.1, &design).expect("posterior");
        let p2 = fit_predict(&x, &y, 0.1, 0.1, &design).expect("posterior");
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_concurrent_calls() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let x = Array1::random_using(30, Uniform::new(0., 1.), &mut rng);
        let y = computer_simulator(&x);
        let design = Array::linspace(0., 1., 101);
        let expected = fit_predict(&x, &y, 0.1, 0.1, &design).expect("posterior");

        let results: Vec<Posterior<f64>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| fit_predict(&x, &y, 0.1, 0.1, &design)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread joined").expect("posterior"))
                .collect()
        });
        for posterior in results {
            assert_eq!(posterior, expected);
        }
    }

    #[test]
    fn test_tiny_length_scale() {
        let x = array![0.1, 0.4, 0.7];
        let y = array![1.0, 2.0, 1.5];
        let posterior = fit_predict(&x, &y, 1e-300, 0., &array![0.2, 0.4]).expect("posterior");
        assert_eq!(posterior.mean()[0], 0.);
        assert_eq!(posterior.variance()[0], 1.);
        assert_abs_diff_eq!(posterior.mean()[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.variance()[1], 0., epsilon = 1e-12);
    }

    #[test]
    fn test_single_training_point() {
        let x = array![0.5];
        let y = array![2.0];
        let design = array![0.5, 0.6, 3.];
        let posterior = fit_predict(&x, &y, 0.2, 0.1, &design).expect("posterior");
        // mean = k(x*, x) / (1 + sig^2) * y
        let k = (-0.01f64 / 0.08).exp();
        assert_abs_diff_eq!(posterior.mean()[0], 2.0 / 1.01, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.mean()[1], k * 2.0 / 1.01, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.variance()[0], 1. - 1. / 1.01, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.variance()[1], 1. - k * k / 1.01, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.mean()[2], 0., epsilon = 1e-12);
    }

    #[test]
    fn test_empty_design() {
        let x = array![0.1, 0.4];
        let y = array![1.0, 2.0];
        let design: Array1<f64> = array![];
        let posterior = fit_predict(&x, &y, 0.2, 0.01, &design).expect("posterior");
        assert!(posterior.is_empty());
        assert!(posterior.variance().is_empty());
    }

    #[test]
    fn test_duplicated_points_without_noise_are_singular() {
        let x = array![0.3, 0.3];
        let y = array![1.0, 2.0];
        let design = array![0.3, 0.5];
        let res = fit_predict(&x, &y, 0.2, 0., &design);
        assert!(matches!(res, Err(GpError::SingularSystem(_))));
    }

    #[test]
    fn test_duplicated_points_with_noise_are_averaged() {
        let x = array![0.3, 0.3];
        let y = array![1.0, 2.0];
        let design = array![0.3];
        let posterior = fit_predict(&x, &y, 0.2, 0.01, &design).expect("posterior");
        assert_abs_diff_eq!(posterior.mean()[0], 1.5, epsilon = 1e-3);
    }

    #[test]
    fn test_ill_conditioned_training_covariance() {
        let x = array![0., 1e-7, 1.];
        let y = array![0.0, 0.1, 1.0];
        let res = fit_predict(&x, &y, 1., 0., &array![0.5]);
        assert!(matches!(res, Err(GpError::SingularSystem(_))));
    }

    #[test]
    fn test_invalid_inputs() {
        let x = array![0.1, 0.4, 0.7];
        let y = array![1.0, 2.0, 1.5];
        let design = array![0.2];
        assert!(matches!(
            fit_predict(&x, &y, 0., 0.01, &design),
            Err(GpError::InvalidHyperparameter(_))
        ));
        assert!(matches!(
            fit_predict(&x, &y, 0.2, -0.01, &design),
            Err(GpError::InvalidHyperparameter(_))
        ));
        assert!(matches!(
            fit_predict(&x, &array![1.0, 2.0], 0.2, 0.01, &design),
            Err(GpError::ShapeMismatch(_))
        ));
        let empty: Array1<f64> = array![];
        assert!(matches!(
            fit_predict(&empty, &empty, 0.2, 0.01, &design),
            Err(GpError::ShapeMismatch(_))
        ));
        assert!(matches!(
            fit_predict(&x, &array![1.0, f64::NAN, 1.5], 0.2, 0.01, &design),
            Err(GpError::NonFiniteInput(_))
        ));
        assert!(matches!(
            fit_predict(&x, &y, 0.2, 0.01, &array![f64::INFINITY]),
            Err(GpError::NonFiniteInput(_))
        ));
    }

    #[test]
    fn test_fit_then_predict_matches_fit_predict() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let x = Array1::random_using(10, Uniform::new(0., 1.), &mut rng);
        let noise = Array1::random_using(10, Normal::new(0., 0.1).unwrap(), &mut rng);
        let y = computer_simulator(&x) + noise;
        let design = Array::linspace(0., 1., 101);

        let gp = Gpr::params(0.1, 0.1)
            .fit(&Dataset::new(x.clone().insert_axis(Axis(1)), y.clone()))
            .expect("GP fitted");
        assert_eq!(gp.dims(), (10, 1));
        let posterior = gp
            .predict_valvar(&design.clone().insert_axis(Axis(1)))
            .expect("GP prediction");
        let expected = fit_predict(&x, &y, 0.1, 0.1, &design).expect("posterior");
        assert_abs_diff_eq!(*posterior.mean(), *expected.mean(), epsilon = 1e-12);
        assert_abs_diff_eq!(
            *posterior.variance(),
            *expected.variance(),
            epsilon = 1e-12
        );

        let xplot = design.insert_axis(Axis(1));
        let ypred: Array1<f64> = Predict::predict(&gp, &xplot);
        assert_abs_diff_eq!(ypred, *expected.mean(), epsilon = 1e-12);
    }

    #[test]
    fn test_design_dimension_mismatch() {
        let gp = Gpr::params(0.5, 0.1)
            .fit(&Dataset::new(array![[0., 1.], [1., 0.]], array![1., 2.]))
            .expect("GP fitted");
        assert!(matches!(
            gp.predict_valvar(&array![[0.5]]),
            Err(GpError::ShapeMismatch(_))
        ));
        let posterior = gp.predict_valvar(&array![[0., 1.], [0.5, 0.5]]).unwrap();
        assert_eq!(posterior.len(), 2);
    }

    #[test]
    fn test_likelihood() {
        // single point: log N(y; 0, 1 + sig^2)
        let gp = Gpr::params(0.2, 0.5)
            .fit(&Dataset::new(array![[0.3]], array![1.0]))
            .expect("GP fitted");
        let var: f64 = 1.25;
        let expected = -0.5 * 1.0 / var - 0.5 * var.ln() - 0.5 * (2. * std::f64::consts::PI).ln();
        assert_abs_diff_eq!(gp.likelihood(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_likelihood_prefers_sensible_length_scale() {
        let x = Array::linspace(0., 1., 20);
        let y = x.mapv(|v| (2. * std::f64::consts::PI * v).sin());
        let xt = x.insert_axis(Axis(1));
        let ds = Dataset::new(xt, y);
        let good = Gpr::params(0.2, 0.01).fit(&ds).expect("GP fitted");
        let bad = Gpr::params(0.005, 0.01).fit(&ds).expect("GP fitted");
        assert!(good.likelihood() > bad.likelihood());
    }

    #[test]
    fn test_confidence_band() {
        let x = array![0.1, 0.4, 0.7];
        let y = array![1.0, 2.0, 1.5];
        let posterior = fit_predict(&x, &y, 0.2, 0.1, &array![0.25, 2.]).expect("posterior");
        let (lower, upper) = posterior.confidence_band(2.);
        let std = posterior.std_dev();
        assert_abs_diff_eq!(&upper - &lower, std.mapv(|s| 4. * s), epsilon = 1e-12);
        assert_abs_diff_eq!((&upper + &lower) / 2., *posterior.mean(), epsilon = 1e-12);
        let (mean, variance) = posterior.into_parts();
        assert_eq!(mean.len(), 2);
        assert_eq!(variance.len(), 2);
    }

    #[cfg(feature = "serializable")]
    #[test]
    fn test_serialize_posterior() {
        let x = array![0.1, 0.4, 0.7];
        let y = array![1.0, 2.0, 1.5];
        let posterior = fit_predict(&x, &y, 0.2, 0.1, &x).expect("posterior");
        let json = serde_json::to_string(&posterior).expect("serialized");
        let loaded: Posterior<f64> = serde_json::from_str(&json).expect("deserialized");
        assert_eq!(posterior, loaded);
    }

    #[cfg(feature = "persistent")]
    #[test]
    fn test_save_load_posterior() {
        let test_dir = "target/tests";
        std::fs::create_dir_all(test_dir).ok();
        let x = array![0.1, 0.4, 0.7];
        let y = array![1.0, 2.0, 1.5];
        let posterior = fit_predict(&x, &y, 0.2, 0.1, &x).expect("posterior");
        let file_path = format!("{}/{}", test_dir, "posterior.json");
        posterior.save(&file_path).expect("saved");
        let loaded = Posterior::load(&file_path).expect("loaded");
        assert_eq!(posterior, loaded);
    }
}
