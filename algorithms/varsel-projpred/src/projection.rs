//! Projection of reference draws onto submodels
use ndarray::{concatenate, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::linalg;
use varsel::traits::PredictInplace;

use crate::error::{ProjPredError, Result};

/// Pivots of the Gram matrix below this fraction of its diagonal mark a dependent column
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Intercept column followed by the selected columns of `x`
pub(crate) fn design<D: Data<Elem = f64>>(x: &ArrayBase<D, Ix2>, variables: &[usize]) -> Result<Array2<f64>> {
    let ones = Array2::ones((x.nrows(), 1));
    let selected = x.select(Axis(1), variables);

    Ok(concatenate(Axis(1), &[ones.view(), selected.view()]).map_err(varsel::Error::from)?)
}

/// Least squares weights of every column of `targets` regressed on `design`
///
/// Returns an array of shape `(design.ncols(), targets.ncols())`.
pub(crate) fn least_squares(design: &Array2<f64>, targets: ArrayView2<f64>) -> Result<Array2<f64>> {
    let gram = design.t().dot(design);
    let l = linalg::cholesky_lower(&gram)?;
    // a column that is (numerically) a combination of the previous ones leaves a vanishing pivot
    for i in 0..gram.nrows() {
        if l[(i, i)] * l[(i, i)] <= PIVOT_TOLERANCE * gram[(i, i)] {
            return Err(ProjPredError::Collinear);
        }
    }
    let z = linalg::solve_lower(&l, design.t().dot(&targets))?;

    Ok(linalg::solve_lower_transposed(&l, z)?)
}

/// Squared distance between every column of `targets` and its least squares fit
pub(crate) fn discrepancy(design: &Array2<f64>, targets: ArrayView2<f64>) -> Result<Array1<f64>> {
    let weights = least_squares(design, targets)?;
    let residual = &targets - &design.dot(&weights);

    Ok(residual.mapv(|r| r * r).sum_axis(Axis(0)))
}

/// Reference draws projected onto a fixed set of covariates
///
/// Every reference draw yields one projected draw: its fitted values regressed on the intercept
/// and the selected covariates, with the noise inflated by the mean squared discrepancy of the
/// projection.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SubmodelProjection {
    pub(crate) variables: Vec<usize>,
    pub(crate) intercept_draws: Array1<f64>,
    pub(crate) coefficient_draws: Array2<f64>,
    pub(crate) sigma_draws: Array1<f64>,
}

impl SubmodelProjection {
    /// Project every draw of `fitted` (shape `(n_draws, n_samples)`) onto `variables`
    pub(crate) fn new(
        x: ArrayView2<f64>,
        variables: &[usize],
        fitted: &Array2<f64>,
        sigma: &Array1<f64>,
    ) -> Result<Self> {
        let n_samples = x.nrows() as f64;
        let z = design(&x, variables)?;
        let weights = least_squares(&z, fitted.t())?;

        let residual = &fitted.t() - &z.dot(&weights);
        let sigma_draws = residual
            .mapv(|r| r * r)
            .sum_axis(Axis(0))
            .iter()
            .zip(sigma.iter())
            .map(|(rss, s)| (s * s + rss / n_samples).sqrt())
            .collect();

        let mut coefficient_draws = Array2::zeros((fitted.nrows(), x.ncols()));
        for (k, j) in variables.iter().enumerate() {
            coefficient_draws
                .column_mut(*j)
                .assign(&weights.row(k + 1));
        }

        Ok(SubmodelProjection {
            variables: variables.to_vec(),
            intercept_draws: weights.row(0).to_owned(),
            coefficient_draws,
            sigma_draws,
        })
    }

    /// Indices of the covariates in the submodel, in order of inclusion
    pub fn variables(&self) -> &[usize] {
        &self.variables
    }

    pub fn size(&self) -> usize {
        self.variables.len()
    }

    pub fn intercept_draws(&self) -> &Array1<f64> {
        &self.intercept_draws
    }

    /// Projected coefficients with shape `(n_draws, n_features)`, zero outside the submodel
    pub fn coefficient_draws(&self) -> &Array2<f64> {
        &self.coefficient_draws
    }

    /// Projected noise standard deviation of every draw
    pub fn sigma_draws(&self) -> &Array1<f64> {
        &self.sigma_draws
    }

    /// Mean of the projected coefficients
    pub fn coefficients(&self) -> Array1<f64> {
        self.coefficient_draws.sum_axis(Axis(0)) / self.coefficient_draws.nrows() as f64
    }

    pub fn intercept(&self) -> f64 {
        self.intercept_draws.sum() / self.intercept_draws.len() as f64
    }

    /// Linear predictor of every projected draw with shape `(n_draws, n_samples)`
    pub fn predictive_draws<D: Data<Elem = f64>>(&self, x: &ArrayBase<D, Ix2>) -> Array2<f64> {
        let mut draws = self.coefficient_draws.dot(&x.t());
        for (mut row, b) in draws.rows_mut().into_iter().zip(self.intercept_draws.iter()) {
            row += *b;
        }

        draws
    }
}

impl<D: Data<Elem = f64>> PredictInplace<ArrayBase<D, Ix2>, Array1<f64>> for SubmodelProjection {
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<f64>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        *y = x.dot(&self.coefficients()) + self.intercept();
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<f64> {
        Array1::zeros(x.nrows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn exact_projection_keeps_the_noise() {
        let x = array![[1., 0., 2.], [2., 1., 0.], [3., 0., 1.], [4., 1., 3.], [5., 0., 0.]];
        // two draws that only depend on the first covariate
        let fitted = array![[1., 2., 3., 4., 5.], [2.5, 4.5, 6.5, 8.5, 10.5]];
        let sigma = array![1.0, 0.5];

        let projection = SubmodelProjection::new(x.view(), &[0], &fitted, &sigma).unwrap();
        assert_abs_diff_eq!(projection.intercept_draws(), &array![0.0, 0.5], epsilon = 1e-10);
        assert_abs_diff_eq!(
            projection.coefficient_draws(),
            &array![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(projection.sigma_draws(), &sigma, epsilon = 1e-10);
        assert_abs_diff_eq!(projection.predictive_draws(&x), fitted, epsilon = 1e-10);
    }

    #[test]
    fn intercept_only_projection_inflates_the_noise() {
        let x = array![[0.], [1.], [2.], [3.]];
        let fitted = array![[0., 1., 2., 3.]];
        let sigma = array![1.0];

        let projection = SubmodelProjection::new(x.view(), &[], &fitted, &sigma).unwrap();
        // projected onto the mean 1.5, residual sum of squares 5 over 4 samples
        assert_abs_diff_eq!(projection.intercept(), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(projection.sigma_draws()[0], (1.0f64 + 1.25).sqrt(), epsilon = 1e-12);
        assert_eq!(projection.size(), 0);
    }

    #[test]
    fn duplicated_column_is_rejected() {
        let x = array![[0., 0.], [1., 1.], [2., 2.], [3., 3.]];
        let targets = array![[1.], [2.], [2.], [4.]];

        let z = design(&x, &[0, 1]).unwrap();
        assert!(least_squares(&z, targets.view()).is_err());
        let z = design(&x, &[1]).unwrap();
        assert!(least_squares(&z, targets.view()).is_ok());
    }

    #[test]
    fn discrepancy_of_every_column() {
        let z = design(&array![[0.], [1.], [2.]], &[0]).unwrap();
        let targets = array![[0., 1.], [1., 0.], [2., 1.]];

        // first column is linear, the second has residuals (-1/3, 2/3, -1/3)
        let d = discrepancy(&z, targets.view()).unwrap();
        assert_abs_diff_eq!(d, array![0.0, 2.0 / 3.0], epsilon = 1e-12);
    }
}
