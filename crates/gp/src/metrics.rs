//! A module for metrics to evaluate the predictive quality of GP models
//! with hand-picked hyperparameters.
//!
//! The Q2 predictive coefficient is computed by k-fold cross validation:
//! `Q2 = 1 - PRESS / TSS` where PRESS is the predictive residual sum of squares
//! over held-out folds and TSS the total sum of squares of the outputs.
//! A value close to 1 means good predictions, a value close to or below 0 means
//! the model does not predict better than the output mean.

use linfa::dataset::Dataset;
use linfa::{
    traits::{Fit, Predict, PredictInplace},
    Float, ParamGuard,
};
use ndarray::{Array1, Array2};

use crate::{correlation_models, GaussianProcess, GpError, GpParams};

/// A trait for Q2 predictive coefficient cross validation score
pub trait PredictScore<F, ER, P, O>
where
    F: Float,
    ER: std::error::Error + From<linfa::error::Error> + From<GpError>,
    P: Fit<Array2<F>, Array1<F>, ER, Object = O> + ParamGuard,
    O: PredictInplace<Array2<F>, Array1<F>>,
{
    /// Return the training data (xt, yt)
    fn training_data(&self) -> &(Array2<F>, Array1<F>);

    /// Return the model parameters
    fn params(&self) -> P;

    /// Compute quality metric Q2 with kfold cross validation
    ///
    /// Returns an error when `kfold` is not in `[2, n]` or when training outputs are constant.
    fn q2_score(&self, kfold: usize) -> Result<F, ER> {
        let (xt, yt) = self.training_data();
        let n_obs = xt.nrows();
        if kfold < 2 || kfold > n_obs {
            return Err(GpError::InvalidValueError(format!(
                "cross-validation: kfold should be in [2, {n_obs}], got {kfold}"
            ))
            .into());
        }
        let dataset = Dataset::new(xt.to_owned(), yt.to_owned());
        let yt_mean = yt.mean().ok_or_else(|| {
            GpError::InvalidValueError("cross-validation: empty training set".to_string())
        })?;
        // Predictive Residual Sum of Squares
        let mut press = F::zero();
        // Total Sum of Squares
        let mut tss = F::zero();
        for (train, valid) in dataset.fold(kfold).into_iter() {
            let model: O = self.params().fit(&train)?;
            let pred = model.predict(valid.records());
            press += (valid.targets() - pred).mapv(|v| v * v).sum();
            tss += valid.targets().mapv(|v| (v - yt_mean) * (v - yt_mean)).sum();
        }
        if tss == F::zero() {
            return Err(GpError::InvalidValueError(
                "cross-validation: Q2 undefined for constant training outputs".to_string(),
            )
            .into());
        }
        Ok(F::one() - press / tss)
    }

    /// Q2 predictive coefficient with Leave-One-Out Cross-Validation
    fn looq2_score(&self) -> Result<F, ER> {
        self.q2_score(self.training_data().0.nrows())
    }
}

impl<F, Corr> PredictScore<F, GpError, GpParams<F, Corr>, Self> for GaussianProcess<F, Corr>
where
    F: Float,
    Corr: correlation_models::CorrelationModel<F>,
{
    fn training_data(&self) -> &(Array2<F>, Array1<F>) {
        &self.training_data
    }

    fn params(&self) -> GpParams<F, Corr> {
        GpParams::from(self.params.clone())
    }
}
