//! Principal components regression
//!
//! The covariates are (optionally) standardised, rotated onto their principal axes and only the
//! leading `n_components` scores enter an ordinary least squares fit. Dropping the trailing
//! components removes the directions in which correlated covariates carry almost no variance,
//! which are exactly the directions that inflate the variance of least squares estimates.
use log::debug;
use ndarray::{Array1, ArrayBase, Data, Ix1, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::dataset::check_single_target;
use varsel::metrics::SingleTargetRegression;
use varsel::preprocessing::Standardization;
use varsel::traits::{Fit, Predict, PredictInplace};
use varsel::{DatasetBase, ParamGuard};
use varsel_linear::{FittedLinearRegression, LinearRegression};

use crate::error::{ReductionError, Result};
use crate::pca::Pca;

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PcrValidParams {
    n_components: usize,
    standardize: bool,
}

impl PcrValidParams {
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    pub fn standardize(&self) -> bool {
        self.standardize
    }
}

/// A hyper-parameter set for principal components regression
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [n_components](Self::n_components) | | Number of leading components used as regressors | `[1, n_features]` |
/// | [standardize](Self::standardize) | `true` | Scale columns to unit variance before the rotation | `false`, `true` |
#[derive(Debug, Clone, PartialEq)]
pub struct PcrParams(PcrValidParams);

impl PcrParams {
    pub fn standardize(mut self, standardize: bool) -> Self {
        self.0.standardize = standardize;
        self
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.0.n_components = n_components;
        self
    }
}

impl ParamGuard for PcrParams {
    type Checked = PcrValidParams;
    type Error = ReductionError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_components == 0 {
            Err(ReductionError::NonPositiveEmbeddingSize)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Fitted principal components regression
///
/// Keeps the rotation, the least squares fit on the component scores and the equivalent
/// coefficients on the original covariates.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Pcr {
    standardization: Option<Standardization<f64>>,
    pca: Pca<f64>,
    regression: FittedLinearRegression<f64>,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl Pcr {
    pub fn params(n_components: usize) -> PcrParams {
        PcrParams(PcrValidParams {
            n_components,
            standardize: true,
        })
    }

    /// Mean validation error for every number of components
    ///
    /// Entry `i` of the result belongs to a regression on the leading `i + 1` components, so the
    /// array covers `1..=n_features`. Columns are standardised before the rotation.
    pub fn cross_validate<D: Data<Elem = f64>, T: Data<Elem = f64>>(
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>,
        k: usize,
    ) -> Result<Array1<f64>> {
        let models = (1..=dataset.nfeatures())
            .map(Pcr::params)
            .collect::<Vec<_>>();

        dataset.cross_validate_single(k, &models, |prediction, truth| {
            prediction.mean_squared_error(truth)
        })
    }

    /// Principal component analysis of the (standardised) covariates
    pub fn pca(&self) -> &Pca<f64> {
        &self.pca
    }

    /// Least squares fit on the component scores
    pub fn score_regression(&self) -> &FittedLinearRegression<f64> {
        &self.regression
    }

    /// Coefficients on the original covariates
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_components(&self) -> usize {
        self.pca.embedding_size()
    }
}

impl<D: Data<Elem = f64>, T: Data<Elem = f64>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, ReductionError> for PcrValidParams
{
    type Object = Pcr;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>) -> Result<Pcr> {
        let (x, y) = (dataset.records(), dataset.targets());
        check_single_target(x, y)?;

        let standardization = if self.standardize {
            Some(Standardization::fit(x)?)
        } else {
            None
        };
        let z = match &standardization {
            Some(s) => s.transform(x),
            None => x.to_owned(),
        };

        let pca = Pca::params(self.n_components).fit(&DatasetBase::from(z.view()))?;
        let scores: ndarray::Array2<f64> = pca.predict(&z);
        let names = (1..=self.n_components)
            .map(|i| format!("PC{}", i))
            .collect::<Vec<_>>();
        let regression = LinearRegression::new()
            .fit(&DatasetBase::new(scores, y.to_owned()).with_feature_names(names))?;

        // y = b + (z - m) V' g = (b - m . V'g) + z V'g
        let mut coefficients = pca.components().t().dot(regression.params());
        let mut intercept = regression.intercept() - pca.mean().dot(&coefficients);
        if let Some(s) = &standardization {
            let (params, b) = s.unscale_coefficients(&coefficients, intercept);
            coefficients = params;
            intercept = b;
        }
        debug!(
            "principal components regression on {} components, r2 {}",
            self.n_components,
            regression.r2()
        );

        Ok(Pcr {
            standardization,
            pca,
            regression,
            coefficients,
            intercept,
        })
    }
}

impl<D: Data<Elem = f64>> PredictInplace<ArrayBase<D, Ix2>, Array1<f64>> for Pcr {
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<f64>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        *y = x.dot(&self.coefficients) + self.intercept;
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
    use rand::{rngs::SmallRng, SeedableRng};
    use varsel::Dataset;
    use varsel_datasets::{CovariancePattern, SyntheticRegression};

    fn correlated_problem(seed: u64) -> SyntheticRegression {
        let mut rng = SmallRng::seed_from_u64(seed);
        SyntheticRegression::params()
            .n_samples(120)
            .pattern(CovariancePattern::blocks(&[3, 3]))
            .standard_deviations(vec![1.0, 2.0, 0.5, 1.0, 3.0, 1.0])
            .association(0.8)
            .coefficients(vec![1.0, 0.5, 0.0, 0.0, -0.5, 0.0])
            .intercept(2.0)
            .generate(&mut rng)
            .unwrap()
    }

    #[test]
    fn all_components_equal_least_squares() {
        let problem = correlated_problem(42);
        let dataset = problem.dataset();
        let ols = LinearRegression::new().fit(dataset).unwrap();

        for standardize in [true, false] {
            let pcr = Pcr::params(6).standardize(standardize).fit(dataset).unwrap();

            assert_abs_diff_eq!(pcr.coefficients(), ols.params(), epsilon = 1e-8);
            assert_abs_diff_eq!(pcr.intercept(), ols.intercept(), epsilon = 1e-8);

            let a: Array1<f64> = pcr.predict(dataset.records());
            let b: Array1<f64> = ols.predict(dataset.records());
            assert_abs_diff_eq!(a, b, epsilon = 1e-8);
        }
    }

    #[test]
    fn predictions_match_score_regression() {
        let problem = correlated_problem(1);
        let dataset = problem.dataset();
        let pcr = Pcr::params(2).fit(dataset).unwrap();

        assert_eq!(pcr.n_components(), 2);
        assert_eq!(pcr.score_regression().params().len(), 2);
        assert_eq!(pcr.score_regression().feature_names(), &["PC1", "PC2"]);

        // the fitted values on the scores and on the original columns agree
        let z = pcr.standardization.as_ref().unwrap().transform(dataset.records());
        let scores: ndarray::Array2<f64> = pcr.pca().predict(&z);
        let on_scores: Array1<f64> = pcr.score_regression().predict(&scores);
        let on_columns: Array1<f64> = pcr.predict(dataset.records());
        assert_abs_diff_eq!(on_scores, on_columns, epsilon = 1e-8);
    }

    #[test]
    fn cross_validation_covers_every_size() {
        let problem = correlated_problem(5);
        let mse = Pcr::cross_validate(problem.dataset(), 5).unwrap();

        assert_eq!(mse.len(), 6);
        assert!(mse.iter().all(|m| m.is_finite() && *m > 0.0));
        // one component misses the second block entirely
        assert!(mse[0] > mse[5]);
    }

    #[test]
    fn perfectly_associated_covariates_share_their_effect() {
        let mut rng = SmallRng::seed_from_u64(3);
        let problem = SyntheticRegression::params()
            .n_samples(120)
            .pattern(CovariancePattern::blocks(&[2, 1]))
            .association(1.0)
            .coefficients(vec![0.5, 0.5, -1.0])
            .generate(&mut rng)
            .unwrap();

        // the third component has zero variance and is left out
        let pcr = Pcr::params(2).fit(problem.dataset()).unwrap();
        let coefficients = pcr.coefficients();

        assert!(pcr.pca().explained_variance()[1] > 1e-3);
        assert_abs_diff_eq!(coefficients[0], coefficients[1], epsilon = 1e-6);
        assert_abs_diff_eq!(coefficients[0] + coefficients[1], 1.0, epsilon = 0.3);
        assert_abs_diff_eq!(coefficients[2], -1.0, epsilon = 0.3);
    }

    #[test]
    fn invalid_components() {
        let dataset = Dataset::new(array![[1., 2.], [3., 4.], [0., 1.], [2., 2.]], array![1., 2., 3., 4.]);

        assert!(matches!(
            Pcr::params(0).fit(&dataset),
            Err(ReductionError::NonPositiveEmbeddingSize)
        ));
        assert!(matches!(
            Pcr::params(3).fit(&dataset),
            Err(ReductionError::DimensionIncrease(3, 2))
        ));
    }
}
