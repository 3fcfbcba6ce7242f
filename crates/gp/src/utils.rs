use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Dimension, Ix1, Ix2};
use ndarray_stats::QuantileExt;

/// Build a prediction grid of `n_points` evenly spaced values spanning
/// the range `[min(x), max(x)]` of the given training inputs.
pub fn design_grid<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    n_points: usize,
) -> Result<Array1<F>> {
    check_finite(x, "training inputs")?;
    let lower = *x
        .min()
        .map_err(|e| GpError::ShapeMismatch(format!("cannot build design grid: {e}")))?;
    let upper = *x
        .max()
        .map_err(|e| GpError::ShapeMismatch(format!("cannot build design grid: {e}")))?;
    Ok(Array1::linspace(lower, upper, n_points))
}

/// Return an error naming `what` when `x` contains NaN or infinite values
pub(crate) fn check_finite<F: Float, D: Dimension>(
    x: &ArrayBase<impl Data<Elem = F>, D>,
    what: &str,
) -> Result<()> {
    match x.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(GpError::NonFiniteInput(format!(
            "{what} contain a non-finite value at flat index {i}"
        ))),
        None => Ok(()),
    }
}

/// Whether at least two rows of `x` are equal
pub(crate) fn has_duplicate_rows<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> bool {
    let n_obs = x.nrows();
    (0..n_obs).any(|i| ((i + 1)..n_obs).any(|j| x.row(i) == x.row(j)))
}
