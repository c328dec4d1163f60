//! Random generation of correlated covariates and linear responses

use log::debug;
use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::{
    rand::Rng,
    rand_distr::{Normal, StandardNormal},
    RandomExt,
};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use varsel::{linalg, Dataset, ParamGuard};

use crate::covariance::{structured_covariance, CovariancePattern};
use crate::error::{DatasetError, Result};

const PSD_TOLERANCE: f64 = 1e-10;

/// Factor `A` with `A A^T = cov`
///
/// The Cholesky factor is used whenever it exists. Singular but positive semi-definite matrices,
/// for example two covariates with association one, fall back to the scaled eigenvectors.
fn covariance_factor<D: Data<Elem = f64>>(cov: &ArrayBase<D, Ix2>) -> Result<Array2<f64>> {
    if let Ok(l) = linalg::cholesky_lower(cov) {
        return Ok(l);
    }

    if !linalg::is_positive_semidefinite(cov, PSD_TOLERANCE)? {
        return Err(DatasetError::NotPositiveSemidefinite);
    }

    debug!("covariance is singular, sampling through its eigendecomposition");
    let (vals, vecs) = linalg::eigh_descending(cov)?;
    let scale = vals.mapv(|x| x.max(0.0).sqrt());

    Ok(vecs * &scale)
}

/// Draw `n` samples of a multivariate normal distribution
///
/// Every row is `mean + A z` with `z` standard normal and `A A^T = cov`.
///
/// # Errors
///
/// * [`DatasetError::NoSamples`] for `n == 0`
/// * [`DatasetError::MismatchedLength`] if `mean` and `cov` disagree in dimension
/// * [`DatasetError::NotPositiveSemidefinite`] if `cov` is not a valid covariance matrix
pub fn multivariate_normal<D1, D2, R>(
    n: usize,
    mean: &ArrayBase<D1, Ix1>,
    cov: &ArrayBase<D2, Ix2>,
    rng: &mut R,
) -> Result<Array2<f64>>
where
    D1: Data<Elem = f64>,
    D2: Data<Elem = f64>,
    R: Rng,
{
    if n == 0 {
        return Err(DatasetError::NoSamples);
    }
    if !cov.is_square() || cov.nrows() != mean.len() {
        return Err(DatasetError::MismatchedLength {
            expected: cov.nrows(),
            actual: mean.len(),
        });
    }

    let factor = covariance_factor(cov)?;
    let z: Array2<f64> = Array::random_using((n, mean.len()), StandardNormal, rng);

    Ok(z.dot(&factor.t()) + mean)
}

/// Linear response `y = intercept + x beta + eps` with `eps ~ N(0, noise_std^2)`
///
/// A zero `noise_std` yields the noiseless response and draws nothing from `rng`.
pub fn linear_response<D1, D2, R>(
    x: &ArrayBase<D1, Ix2>,
    coefficients: &ArrayBase<D2, Ix1>,
    intercept: f64,
    noise_std: f64,
    rng: &mut R,
) -> Result<Array1<f64>>
where
    D1: Data<Elem = f64>,
    D2: Data<Elem = f64>,
    R: Rng,
{
    if x.ncols() != coefficients.len() {
        return Err(DatasetError::MismatchedLength {
            expected: x.ncols(),
            actual: coefficients.len(),
        });
    }
    if !(noise_std.is_finite() && noise_std >= 0.0) {
        return Err(DatasetError::InvalidNoise(noise_std));
    }

    let mut y = x.dot(coefficients) + intercept;
    if noise_std > 0.0 {
        let noise = Normal::new(0.0, noise_std).map_err(|_| DatasetError::InvalidNoise(noise_std))?;
        y += &Array1::random_using(x.nrows(), noise, rng);
    }

    Ok(y)
}

/// Verified configuration of a synthetic regression problem
///
/// See [`SyntheticRegressionParams`] for the meaning of every setting.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticRegressionValidParams {
    n_samples: usize,
    pattern: Option<CovariancePattern>,
    standard_deviations: Option<Array1<f64>>,
    mean: Option<Array1<f64>>,
    association: f64,
    coefficients: Array1<f64>,
    intercept: f64,
    noise_std: f64,
}

impl SyntheticRegressionValidParams {
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn nfeatures(&self) -> usize {
        self.coefficients.len()
    }

    pub fn pattern(&self) -> CovariancePattern {
        self.pattern
            .clone()
            .unwrap_or_else(|| CovariancePattern::independent(self.nfeatures()))
    }

    pub fn standard_deviations(&self) -> Array1<f64> {
        self.standard_deviations
            .clone()
            .unwrap_or_else(|| Array1::ones(self.nfeatures()))
    }

    pub fn mean(&self) -> Array1<f64> {
        self.mean
            .clone()
            .unwrap_or_else(|| Array1::zeros(self.nfeatures()))
    }

    pub fn association(&self) -> f64 {
        self.association
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn noise_std(&self) -> f64 {
        self.noise_std
    }

    /// Covariance matrix of the covariates
    pub fn covariance(&self) -> Result<Array2<f64>> {
        structured_covariance(
            &self.pattern(),
            &self.standard_deviations(),
            self.association,
        )
    }

    /// Draw covariates and response
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<SyntheticRegression> {
        let covariance = self.covariance()?;
        let records = multivariate_normal(self.n_samples, &self.mean(), &covariance, rng)?;
        let targets = linear_response(
            &records,
            &self.coefficients,
            self.intercept,
            self.noise_std,
            rng,
        )?;

        let names = (1..=self.nfeatures())
            .map(|i| format!("x{}", i))
            .collect::<Vec<_>>();
        debug!(
            "generated {} samples of {} covariates with association {}",
            self.n_samples,
            self.nfeatures(),
            self.association
        );

        Ok(SyntheticRegression {
            dataset: Dataset::new(records, targets).with_feature_names(names),
            covariance,
            coefficients: self.coefficients.clone(),
            intercept: self.intercept,
        })
    }
}

/// Configuration of a synthetic regression problem
///
/// The number of covariates is the length of the coefficient vector.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [n_samples](Self::n_samples) | `100` | Number of records | `[1, inf)` |
/// | [coefficients](Self::coefficients) | none | True regression coefficients | non-empty, finite |
/// | [pattern](Self::pattern) | independent | Associated pairs of covariates | one row per covariate |
/// | [standard_deviations](Self::standard_deviations) | ones | Scale of every covariate | `(0, inf)` |
/// | [mean](Self::mean) | zeros | Mean of every covariate | finite |
/// | [association](Self::association) | `0.0` | Correlation of associated pairs | `[-1, 1]` |
/// | [intercept](Self::intercept) | `0.0` | True intercept | finite |
/// | [noise_std](Self::noise_std) | `1.0` | Standard deviation of the response noise | `[0, inf)` |
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticRegressionParams(SyntheticRegressionValidParams);

impl Default for SyntheticRegressionParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticRegressionParams {
    pub fn new() -> Self {
        Self(SyntheticRegressionValidParams {
            n_samples: 100,
            pattern: None,
            standard_deviations: None,
            mean: None,
            association: 0.0,
            coefficients: Array1::zeros(0),
            intercept: 0.0,
            noise_std: 1.0,
        })
    }

    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.0.n_samples = n_samples;
        self
    }

    pub fn coefficients<C: Into<Array1<f64>>>(mut self, coefficients: C) -> Self {
        self.0.coefficients = coefficients.into();
        self
    }

    pub fn pattern(mut self, pattern: CovariancePattern) -> Self {
        self.0.pattern = Some(pattern);
        self
    }

    pub fn standard_deviations<S: Into<Array1<f64>>>(mut self, sd: S) -> Self {
        self.0.standard_deviations = Some(sd.into());
        self
    }

    pub fn mean<M: Into<Array1<f64>>>(mut self, mean: M) -> Self {
        self.0.mean = Some(mean.into());
        self
    }

    pub fn association(mut self, association: f64) -> Self {
        self.0.association = association;
        self
    }

    pub fn intercept(mut self, intercept: f64) -> Self {
        self.0.intercept = intercept;
        self
    }

    pub fn noise_std(mut self, noise_std: f64) -> Self {
        self.0.noise_std = noise_std;
        self
    }

    /// Check the configuration and draw covariates and response
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<SyntheticRegression> {
        self.check_ref()?.generate(rng)
    }
}

impl ParamGuard for SyntheticRegressionParams {
    type Checked = SyntheticRegressionValidParams;
    type Error = DatasetError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let p = self.0.coefficients.len();
        let check_len = |len: usize| {
            if len != p {
                Err(DatasetError::MismatchedLength {
                    expected: p,
                    actual: len,
                })
            } else {
                Ok(())
            }
        };

        if self.0.n_samples == 0 {
            return Err(DatasetError::NoSamples);
        }
        if p == 0 {
            return Err(DatasetError::InvalidPattern(
                "no coefficients, the number of covariates is unknown".to_string(),
            ));
        }
        if let Some(pattern) = &self.0.pattern {
            check_len(pattern.nfeatures())?;
        }
        if let Some(sd) = &self.0.standard_deviations {
            check_len(sd.len())?;
            if let Some(bad) = sd.iter().find(|x| !(x.is_finite() && **x > 0.0)) {
                return Err(DatasetError::InvalidStandardDeviation(*bad));
            }
        }
        let check_finite = |name: &'static str, values: &Array1<f64>| match values
            .iter()
            .find(|x| !x.is_finite())
        {
            Some(value) => Err(DatasetError::NonFinite {
                name,
                value: *value,
            }),
            None => Ok(()),
        };

        check_finite("coefficient", &self.0.coefficients)?;
        if let Some(mean) = &self.0.mean {
            check_len(mean.len())?;
            check_finite("mean", mean)?;
        }
        if !self.0.intercept.is_finite() {
            return Err(DatasetError::NonFinite {
                name: "intercept",
                value: self.0.intercept,
            });
        }
        if !(self.0.association.is_finite() && (-1.0..=1.0).contains(&self.0.association)) {
            return Err(DatasetError::InvalidAssociation(self.0.association));
        }
        if !(self.0.noise_std.is_finite() && self.0.noise_std >= 0.0) {
            return Err(DatasetError::InvalidNoise(self.0.noise_std));
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// A generated regression problem together with its ground truth
#[derive(Debug, Clone)]
pub struct SyntheticRegression {
    dataset: Dataset<f64>,
    covariance: Array2<f64>,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl SyntheticRegression {
    pub fn params() -> SyntheticRegressionParams {
        SyntheticRegressionParams::new()
    }

    pub fn dataset(&self) -> &Dataset<f64> {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset<f64> {
        self.dataset
    }

    /// Covariance matrix the covariates were drawn from
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Indices of the covariates with a non-zero coefficient
    pub fn support(&self) -> Vec<usize> {
        self.coefficients
            .indexed_iter()
            .filter(|(_, x)| **x != 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Empirical covariance of the generated covariates
    pub fn sample_covariance(&self) -> Array2<f64> {
        let records = self.dataset.records();
        let n = records.nrows().max(2) as f64;
        let mean = records.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(0));
        let centered = records - &mean;

        centered.t().dot(&centered) / (n - 1.0)
    }
}
