//! Ordinary Least Squares
#![allow(non_snake_case)]
use crate::error::{LinearError, Result};
use log::debug;
use ndarray::{concatenate, s, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::dataset::{check_single_target, DatasetBase};
use varsel::linalg;
use varsel::metrics::SingleTargetRegression;
use varsel::traits::{Fit, PredictInplace};
use varsel::Float;

/// An ordinary least squares linear regression model.
///
/// LinearRegression fits a linear model to minimize the residual sum of
/// squares between the observed targets in the dataset, and the targets
/// predicted by the linear approximation.
///
/// Ordinary least squares regression solves the overconstrained model
///
/// y = Xb + c
///
/// by finding b and c which minimize the L_2 norm ||y - Xb - c||_2. The normal equations
/// `X'X b = X'y` are solved with a Cholesky decomposition, which fails for exactly collinear
/// covariates.
///
/// ## Examples
///
/// ```ignore
/// use varsel::traits::{Fit, Predict};
/// use varsel_linear::LinearRegression;
///
/// let model = LinearRegression::default().fit(&dataset)?;
/// for row in model.summary() {
///     println!("{:>10} {:8.3} (p = {:.3})", row.name, row.estimate, row.p_value);
/// }
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    fit_intercept: bool,
}

/// A fitted linear regression model which can be used for making predictions.
///
/// Besides the coefficients it keeps the covariance matrix of the estimates, so standard errors,
/// t statistics and p-values are available without refitting.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct FittedLinearRegression<F> {
    intercept: F,
    params: Array1<F>,
    /// covariance of all estimates, the intercept comes first when fitted
    pub(crate) covariance: Array2<F>,
    residual_variance: F,
    pub(crate) dof: usize,
    r2: F,
    pub(crate) fit_intercept: bool,
    pub(crate) feature_names: Vec<String>,
}

impl Default for LinearRegression {
    fn default() -> Self {
        LinearRegression::new()
    }
}

/// Configure and fit a linear regression model
impl LinearRegression {
    /// Create a default linear regression model.
    /// By default, an intercept will be fitted.
    pub fn new() -> LinearRegression {
        LinearRegression {
            fit_intercept: true,
        }
    }

    /// Configure the linear regression model to fit an intercept.
    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.fit_intercept = intercept;
        self
    }
}

impl<F: Float, D: Data<Elem = F>, T: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, LinearError> for LinearRegression
{
    type Object = FittedLinearRegression<F>;

    /// Fit a linear regression model given a feature matrix `X` and a target
    /// variable `y`.
    ///
    /// The feature matrix `X` must have shape `(n_samples, n_features)`
    ///
    /// The target variable `y` must have shape `(n_samples)`
    ///
    /// Fails with [`LinearError::NotEnoughSamples`] unless there are more samples than
    /// parameters, since the residual variance needs at least one degree of freedom.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>) -> Result<Self::Object> {
        let X = dataset.records();
        let y = dataset.targets();
        check_single_target(X, y)?;

        let (n_samples, n_features) = X.dim();
        let n_params = n_features + usize::from(self.fit_intercept);
        if n_samples <= n_params {
            return Err(LinearError::NotEnoughSamples {
                samples: n_samples,
                parameters: n_params,
            });
        }

        let design = if self.fit_intercept {
            concatenate(Axis(1), &[Array2::ones((n_samples, 1)).view(), X.view()])
                .map_err(varsel::Error::from)?
        } else {
            X.to_owned()
        };

        let gram = design.t().dot(&design);
        let l = linalg::cholesky_lower(&gram)?;
        let estimates = linalg::cho_solve(&l, &design.t().dot(y))?;

        let fitted = design.dot(&estimates);
        let rss = (y - &fitted).mapv(|r| r * r).sum();
        let dof = n_samples - n_params;
        let residual_variance = rss / F::cast(dof);

        let inverse = linalg::solve_lower_transposed(&l, linalg::solve_lower(&l, Array2::eye(n_params))?)?;
        let covariance = inverse * residual_variance;

        let (intercept, params) = if self.fit_intercept {
            (estimates[0], estimates.slice(s![1..]).to_owned())
        } else {
            (F::zero(), estimates)
        };
        let r2 = fitted.r2(y)?;
        debug!(
            "least squares fit with {} parameters, residual variance {}, r2 {}",
            n_params, residual_variance, r2
        );

        Ok(FittedLinearRegression {
            intercept,
            params,
            covariance,
            residual_variance,
            dof,
            r2,
            fit_intercept: self.fit_intercept,
            feature_names: dataset.feature_names(),
        })
    }
}

/// View the fitted parameters and make predictions with a fitted
/// linear regresssion model.
impl<F: Float> FittedLinearRegression<F> {
    /// Get the fitted parameters
    pub fn params(&self) -> &Array1<F> {
        &self.params
    }

    /// Get the fitted intercept, 0. if no intercept was fitted
    pub fn intercept(&self) -> F {
        self.intercept
    }

    /// Unbiased estimate of the noise variance, `RSS / (n - k)`
    pub fn residual_variance(&self) -> F {
        self.residual_variance
    }

    /// Residual degrees of freedom `n - k`
    pub fn degrees_of_freedom(&self) -> usize {
        self.dof
    }

    /// Coefficient of determination on the training data
    pub fn r2(&self) -> F {
        self.r2
    }

    /// R squared penalised for the number of parameters
    pub fn adjusted_r2(&self) -> F {
        let n = F::cast(self.dof + self.covariance.nrows());
        let dof_total = if self.fit_intercept { n - F::one() } else { n };

        F::one() - (F::one() - self.r2) * dof_total / F::cast(self.dof)
    }

    /// Covariance matrix of the coefficient estimates, without the intercept
    pub fn covariance(&self) -> Array2<F> {
        let offset = usize::from(self.fit_intercept);
        self.covariance.slice(s![offset.., offset..]).to_owned()
    }

    /// Standard error of every coefficient
    pub fn standard_errors(&self) -> Array1<F> {
        let offset = usize::from(self.fit_intercept);
        self.covariance.diag().slice(s![offset..]).mapv(|v| v.sqrt())
    }

    /// Standard error of the intercept, `None` if no intercept was fitted
    pub fn intercept_standard_error(&self) -> Option<F> {
        if self.fit_intercept {
            Some(self.covariance[(0, 0)].sqrt())
        } else {
            None
        }
    }

    /// Ratio of every coefficient to its standard error
    pub fn t_values(&self) -> Array1<F> {
        &self.params / &self.standard_errors()
    }

    /// Names of the covariates the model was fitted on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for FittedLinearRegression<F>
{
    /// Given an input matrix `X`, with shape `(n_samples, n_features)`,
    /// `predict` returns the target variable according to linear model
    /// learned from the training data distribution.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        *y = x.dot(&self.params) + self.intercept;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}
