//! Regularisation paths
use log::debug;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::{DatasetBase, Float};

use crate::algorithm::Centered;
use crate::error::{LassoError, Result};
use crate::hyperparams::LassoValidParams;
use crate::Lasso;

/// Lasso solutions along a decreasing sequence of penalties
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LassoPath<F> {
    alphas: Array1<F>,
    coefficients: Array2<F>,
    intercepts: Array1<F>,
    duality_gaps: Array1<F>,
}

impl<F: Float> LassoPath<F> {
    /// Penalties in decreasing order
    pub fn alphas(&self) -> &Array1<F> {
        &self.alphas
    }

    /// Coefficients, one row per penalty
    pub fn coefficients(&self) -> &Array2<F> {
        &self.coefficients
    }

    pub fn intercepts(&self) -> &Array1<F> {
        &self.intercepts
    }

    pub fn duality_gaps(&self) -> &Array1<F> {
        &self.duality_gaps
    }

    /// Number of non-zero coefficients at every penalty
    pub fn n_selected(&self) -> Vec<usize> {
        self.coefficients
            .rows()
            .into_iter()
            .map(|row| row.iter().filter(|w| **w != F::zero()).count())
            .collect()
    }

    /// Predictions of every model on the path, one row per penalty
    pub fn predict<D: Data<Elem = F>>(&self, x: &ArrayBase<D, Ix2>) -> Array2<F> {
        let mut out = self.coefficients.dot(&x.t());
        for (mut row, b) in out.rows_mut().into_iter().zip(self.intercepts.iter()) {
            row += *b;
        }
        out
    }
}

/// Smallest penalty for which the Lasso solution is entirely zero
///
/// Equals `max_j |x_j' y| / n` on the centred (and, when enabled, standardised) problem.
pub fn alpha_max<F: Float, D: Data<Elem = F>, T: Data<Elem = F>>(
    dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>,
    params: &LassoValidParams<F>,
) -> Result<F> {
    let problem = Centered::new(dataset.records(), dataset.targets(), params)?;
    Ok(problem.alpha_max())
}

fn log_grid<F: Float>(alpha_max: F, n_alphas: usize, eps: F) -> Array1<F> {
    if n_alphas == 1 {
        return Array1::from_elem(1, alpha_max);
    }
    let hi = alpha_max.ln();
    let lo = (alpha_max * eps).ln();

    Array1::linspace(hi, lo, n_alphas).mapv(|v| v.exp())
}

/// Default penalty grid
///
/// `n_alphas` values spaced evenly on a log scale from [`alpha_max`] down to
/// `eps * alpha_max`. A response without any linear signal gives a grid of zeros.
pub fn alpha_grid<F: Float, D: Data<Elem = F>, T: Data<Elem = F>>(
    dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>,
    n_alphas: usize,
    eps: F,
    params: &LassoValidParams<F>,
) -> Result<Array1<F>> {
    if n_alphas == 0 {
        return Err(LassoError::EmptyPath);
    }
    if !(eps > F::zero() && eps < F::one()) {
        return Err(LassoError::InvalidEps(eps.to_f32().unwrap_or(f32::NAN)));
    }

    let alpha_max = alpha_max(dataset, params)?;
    if alpha_max <= F::zero() {
        return Ok(Array1::zeros(n_alphas));
    }

    Ok(log_grid(alpha_max, n_alphas, eps))
}

pub(crate) fn solve_path<F: Float>(
    problem: &Centered<F>,
    alphas: &[F],
    params: &LassoValidParams<F>,
) -> Vec<Lasso<F>> {
    let mut warm: Option<Array1<F>> = None;
    let mut models = Vec::with_capacity(alphas.len());
    for alpha in alphas {
        let (w, gap, n_steps) = problem.solve(*alpha, params, warm.as_ref());
        models.push(problem.model(&w, *alpha, gap, n_steps));
        warm = Some(w);
    }

    models
}

pub(crate) fn sorted_descending<F: Float>(alphas: &[F]) -> Vec<F> {
    let mut alphas = alphas.to_vec();
    alphas.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    alphas
}

/// Fit the Lasso for every penalty in `alphas`
///
/// The penalties are sorted in decreasing order and every fit starts from the solution of the
/// previous, larger penalty. Only the penalty of `params` is ignored, all other options apply.
///
/// ```ignore
/// let params = Lasso::params().check()?;
/// let grid = alpha_grid(&dataset, 50, 1e-3, &params)?;
/// let path = lasso_path(&dataset, grid.as_slice().unwrap(), &params)?;
/// ```
pub fn lasso_path<F: Float, D: Data<Elem = F>, T: Data<Elem = F>>(
    dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>,
    alphas: &[F],
    params: &LassoValidParams<F>,
) -> Result<LassoPath<F>> {
    if alphas.is_empty() {
        return Err(LassoError::EmptyPath);
    }
    let alphas = sorted_descending(alphas);

    let problem = Centered::new(dataset.records(), dataset.targets(), params)?;
    let models = solve_path(&problem, &alphas, params);
    debug!("solved Lasso path with {} penalties", alphas.len());

    let n_features = dataset.nfeatures();
    let mut coefficients = Array2::zeros((alphas.len(), n_features));
    for (mut row, model) in coefficients.rows_mut().into_iter().zip(models.iter()) {
        row.assign(model.parameters());
    }

    Ok(LassoPath {
        alphas: Array1::from(alphas),
        coefficients,
        intercepts: models.iter().map(|m| m.intercept()).collect(),
        duality_gaps: models.iter().map(|m| m.duality_gap()).collect(),
    })
}
