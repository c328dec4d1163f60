//! Correlation analysis for dataset features
//!
//! Collinearity among covariates is what makes variable selection hard: it inflates the variance
//! of least-squares estimates and lets correlated covariates stand in for each other. This module
//! measures it with the Pearson correlation matrix, variance inflation factors and the condition
//! number of the correlation matrix.
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};

use std::fmt;

use crate::dataset::{DatasetBase, Records};
use crate::error::{Error, Result};
use crate::linalg;
use crate::Float;

/// Calculate the Pearson correlation matrix of the columns of `data`
///
/// Columns with zero variance have undefined correlation, they are reported as `NaN` outside of
/// the diagonal.
fn pearson_correlation<F: Float, D: Data<Elem = F>>(data: &ArrayBase<D, Ix2>) -> Result<Array2<F>> {
    let nobs = data.nrows();
    if nobs < 2 {
        return Err(Error::NotEnoughSamples);
    }

    // subtract mean
    let mean = data.mean_axis(Axis(0)).ok_or(Error::NotEnoughSamples)?;
    let denoised = data - &mean.insert_axis(Axis(0));
    let covariance = denoised.t().dot(&denoised) / F::cast(nobs - 1);
    let std = covariance.diag().mapv(|x| x.sqrt());

    let nfeatures = data.ncols();
    let mut corr = Array2::zeros((nfeatures, nfeatures));
    for i in 0..nfeatures {
        corr[(i, i)] = F::one();
        for j in (i + 1)..nfeatures {
            let val = covariance[(i, j)] / (std[i] * std[j]);
            corr[(i, j)] = val;
            corr[(j, i)] = val;
        }
    }

    Ok(corr)
}

/// Pearson correlation matrix of the features of a dataset
///
/// # Example
///
/// ```ignore
/// let corr = PearsonCorrelation::from_dataset(&dataset)?;
/// println!("{}", corr);
/// ```
#[derive(Debug, Clone)]
pub struct PearsonCorrelation<F> {
    coefficients: Array2<F>,
    feature_names: Vec<String>,
}

impl<F: Float> PearsonCorrelation<F> {
    /// Calculate the Pearson correlation matrix of the records in a dataset
    pub fn from_dataset<D: Data<Elem = F>, T>(
        dataset: &DatasetBase<ArrayBase<D, Ix2>, T>,
    ) -> Result<Self> {
        let coefficients = pearson_correlation(dataset.records())?;

        Ok(PearsonCorrelation {
            coefficients,
            feature_names: dataset.feature_names(),
        })
    }

    /// Full correlation matrix, with ones on the diagonal
    pub fn get_coeffs(&self) -> &Array2<F> {
        &self.coefficients
    }

    /// Largest absolute correlation between two distinct features, with their indices
    pub fn strongest_pair(&self) -> Option<(usize, usize, F)> {
        let n = self.coefficients.nrows();
        let mut best: Option<(usize, usize, F)> = None;
        for i in 0..n {
            for j in (i + 1)..n {
                let val = self.coefficients[(i, j)];
                if val.is_nan() {
                    continue;
                }
                match best {
                    Some((_, _, b)) if b.abs() >= val.abs() => {}
                    _ => best = Some((i, j, val)),
                }
            }
        }

        best
    }
}

impl<F: Float> fmt::Display for PearsonCorrelation<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let n = self.feature_names.len();
        let longest = self.feature_names.iter().map(|x| x.len()).max().unwrap_or(0);

        for i in 0..n {
            write!(f, "{:>width$}", self.feature_names[i], width = longest)?;
            for j in 0..n {
                write!(f, " {:>6.3}", self.coefficients[(i, j)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Variance inflation factor of every feature
///
/// The VIF of feature `j` equals `1 / (1 - R_j^2)`, where `R_j^2` is the coefficient of
/// determination of regressing feature `j` on all other features. It is computed as the diagonal
/// of the inverse correlation matrix. Exactly collinear features make the correlation matrix
/// singular and result in an error.
pub fn variance_inflation_factors<F: Float, D: Data<Elem = F>>(
    records: &ArrayBase<D, Ix2>,
) -> Result<Array1<F>> {
    if records.nsamples() <= records.nfeatures() {
        return Err(Error::NotEnoughSamples);
    }

    let corr = pearson_correlation(records)?;
    let inv = linalg::inverse_spd(&corr)?;

    Ok(inv.diag().to_owned())
}

/// Condition number of the correlation matrix
///
/// The ratio between the largest and smallest eigenvalue. Values above `30` are commonly read as
/// moderate, above `100` as severe collinearity. A singular matrix yields infinity.
pub fn condition_number<F: Float, D: Data<Elem = F>>(records: &ArrayBase<D, Ix2>) -> Result<F> {
    let corr = pearson_correlation(records)?;
    let (eigvals, _) = linalg::eigh_descending(&corr)?;

    let largest = eigvals[0];
    let smallest = eigvals[eigvals.len() - 1];
    if smallest <= F::zero() {
        Ok(F::infinity())
    } else {
        Ok(largest / smallest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dataset;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};
    use ndarray_rand::{rand::SeedableRng, rand_distr::StandardNormal, RandomExt};
    use rand::rngs::SmallRng;

    #[test]
    fn correlation_of_small_dataset() {
        let records = array![[1., 1.], [2., 2.], [3., 1.], [4., 2.]];
        let dataset = Dataset::new(records, Array1::zeros(4));
        let corr = PearsonCorrelation::from_dataset(&dataset).unwrap();

        // cov = 1/3, var = 5/3 and 1/3
        assert_abs_diff_eq!(corr.get_coeffs()[(0, 1)], 0.4472135954999579, epsilon = 1e-10);
        assert_abs_diff_eq!(corr.get_coeffs()[(0, 0)], 1.0);
    }

    #[test]
    fn perfectly_correlated() {
        let records: Array2<f64> = array![[1., 2., -1.], [2., 4., -2.], [3., 6., -3.]];
        let dataset = Dataset::new(records, Array1::zeros(3));
        let corr = PearsonCorrelation::from_dataset(&dataset).unwrap();

        assert_abs_diff_eq!(
            corr.get_coeffs(),
            &array![[1., 1., -1.], [1., 1., -1.], [-1., -1., 1.]],
            epsilon = 1e-10
        );
        let (_, _, val): (usize, usize, f64) = corr.strongest_pair().unwrap();
        assert_abs_diff_eq!(val.abs(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn vif_of_independent_features_is_close_to_one() {
        let mut rng = SmallRng::seed_from_u64(42);
        let records: Array2<f64> = Array2::random_using((2000, 3), StandardNormal, &mut rng);

        let vif = variance_inflation_factors(&records).unwrap();
        for v in vif.iter() {
            assert_abs_diff_eq!(*v, 1.0, epsilon = 0.02);
        }
        assert!(condition_number(&records).unwrap() < 1.5);
    }

    #[test]
    fn vif_of_two_correlated_features() {
        let mut rng = SmallRng::seed_from_u64(42);
        let z: Array2<f64> = Array2::random_using((5000, 2), StandardNormal, &mut rng);
        // x2 = 0.9 x1 + sqrt(1 - 0.81) e, correlation 0.9
        let mut records = Array2::zeros((5000, 2));
        records.column_mut(0).assign(&z.column(0));
        records
            .column_mut(1)
            .assign(&(&z.column(0) * 0.9 + &z.column(1) * 0.19f64.sqrt()));

        // for two features vif = 1 / (1 - r^2) = 5.26
        let vif = variance_inflation_factors(&records).unwrap();
        assert_abs_diff_eq!(vif[0], 1. / 0.19, epsilon = 0.8);
        assert_abs_diff_eq!(vif[0], vif[1], epsilon = 1e-10);

        // eigenvalues of [[1, r], [r, 1]] are 1 + r and 1 - r
        assert_abs_diff_eq!(condition_number(&records).unwrap(), 19.0, epsilon = 3.5);
    }

    #[test]
    fn collinear_features_have_no_vif() {
        let records = array![[1., 2.], [2., 4.], [3., 6.], [4., 8.]];

        // rounding may leave a tiny positive pivot instead of an exact singularity
        if let Ok(vif) = variance_inflation_factors(&records) {
            assert!(vif[0] > 1e6);
        }
        assert!(variance_inflation_factors(&array![[1., 2.], [2., 4.]]).is_err());
    }
}
