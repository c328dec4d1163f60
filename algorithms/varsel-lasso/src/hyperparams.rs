#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::{Float, ParamGuard};

use crate::error::{LassoError, Result};

fn as_f32<F: Float>(x: F) -> f32 {
    x.to_f32().unwrap_or(f32::NAN)
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct LassoValidParams<F> {
    pub(crate) penalty: F,
    pub(crate) with_intercept: bool,
    pub(crate) standardize: bool,
    pub(crate) max_iterations: u32,
    pub(crate) tolerance: F,
}

impl<F: Float> LassoValidParams<F> {
    pub fn penalty(&self) -> F {
        self.penalty
    }

    pub fn with_intercept(&self) -> bool {
        self.with_intercept
    }

    pub fn standardize(&self) -> bool {
        self.standardize
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn tolerance(&self) -> F {
        self.tolerance
    }
}

/// A hyper-parameter set for the Lasso
///
/// Configures and minimizes the following objective function:
/// ```ignore
/// 1 / (2 * n_samples) * ||y - Xw - b||^2_2 + penalty * ||w||_1
/// ```
///
/// The parameter set can be verified into a [`LassoValidParams`] by calling
/// [ParamGuard::check](Self::check). It is also possible to directly fit a model with
/// [Fit::fit](varsel::traits::Fit::fit) which implicitely verifies the parameter set prior to the
/// model estimation and forwards any error.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [penalty](Self::penalty) | `1.0` | L1 penalty, also known as `alpha` | `[0, inf)` |
/// | [with_intercept](Self::with_intercept) | `true` | Enable intercept | `false`, `true` |
/// | [standardize](Self::standardize) | `false` | Penalise coefficients of unit variance columns | `false`, `true` |
/// | [tolerance](Self::tolerance) | `1e-4` | Relative duality gap at convergence | `(0, inf)` |
/// | [max_iterations](Self::max_iterations) | `1000` | Maximum number of sweeps | `[1, inf)` |
///
/// With `standardize` enabled the penalty applies to the coefficients of the standardised
/// columns. The reported coefficients are always on the scale of the original columns.
///
/// # Errors
///
/// Returns [`InvalidPenalty`](LassoError::InvalidPenalty) if the penalty is negative,
/// [`InvalidTolerance`](LassoError::InvalidTolerance) if the tolerance is not positive and
/// [`InvalidMaxIterations`](LassoError::InvalidMaxIterations) for zero iterations.
///
/// # Example
///
/// ```rust
/// use varsel_lasso::{Lasso, LassoError};
/// use varsel::prelude::*;
/// use ndarray::array;
///
/// let ds = Dataset::new(array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]], array![3.0, 2.0, 5.0]);
///
/// // fit model with unchecked parameter set
/// let model = Lasso::params().penalty(1e-3).fit(&ds)?;
///
/// // transform into a verified parameter set and fit again
/// let checked_params = Lasso::params().penalty(1e-3).check()?;
/// let model = checked_params.fit(&ds)?;
/// # Ok::<(), LassoError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LassoParams<F>(pub(crate) LassoValidParams<F>);

impl<F: Float> Default for LassoParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configure and fit a Lasso model
impl<F: Float> LassoParams<F> {
    pub fn new() -> LassoParams<F> {
        Self(LassoValidParams {
            penalty: F::one(),
            with_intercept: true,
            standardize: false,
            max_iterations: 1000,
            tolerance: F::cast(1e-4),
        })
    }

    /// Set the L1 penalty, otherwise known as `alpha`.
    pub fn penalty(mut self, penalty: F) -> Self {
        self.0.penalty = penalty;
        self
    }

    /// Configure the model to fit an intercept.
    /// Defaults to `true` if not set.
    pub fn with_intercept(mut self, with_intercept: bool) -> Self {
        self.0.with_intercept = with_intercept;
        self
    }

    /// Standardise columns before penalising them.
    /// Defaults to `false` if not set.
    pub fn standardize(mut self, standardize: bool) -> Self {
        self.0.standardize = standardize;
        self
    }

    /// Set the tolerance of the duality gap, relative to `||y||^2`.
    ///
    /// Defaults to `1e-4` if not set
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Set the maximum number of coordinate descent sweeps.
    ///
    /// Defaults to `1000` if not set
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.0.max_iterations = max_iterations;
        self
    }
}

fn check_lasso<F: Float>(params: &LassoValidParams<F>) -> Result<()> {
    if params.penalty.is_nan() || params.penalty < F::zero() {
        Err(LassoError::InvalidPenalty(as_f32(params.penalty)))
    } else if params.tolerance.is_nan() || params.tolerance <= F::zero() {
        Err(LassoError::InvalidTolerance(as_f32(params.tolerance)))
    } else if params.max_iterations == 0 {
        Err(LassoError::InvalidMaxIterations)
    } else {
        Ok(())
    }
}

impl<F: Float> ParamGuard for LassoParams<F> {
    type Checked = LassoValidParams<F>;
    type Error = LassoError;

    /// Validate the hyper parameters
    fn check_ref(&self) -> Result<&Self::Checked> {
        check_lasso(&self.0)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct LassoCvValidParams<F> {
    pub(crate) lasso: LassoValidParams<F>,
    pub(crate) n_alphas: usize,
    pub(crate) eps: F,
    pub(crate) n_folds: usize,
    pub(crate) alphas: Option<Vec<F>>,
}

impl<F: Float> LassoCvValidParams<F> {
    /// Options of every Lasso fit, the penalty is ignored
    pub fn lasso(&self) -> &LassoValidParams<F> {
        &self.lasso
    }

    pub fn n_alphas(&self) -> usize {
        self.n_alphas
    }

    pub fn eps(&self) -> F {
        self.eps
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    pub fn alphas(&self) -> Option<&[F]> {
        self.alphas.as_deref()
    }
}

/// A hyper-parameter set for choosing the Lasso penalty by k-fold cross validation
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [n_alphas](Self::n_alphas) | `100` | Number of penalties on the default grid | `[1, inf)` |
/// | [eps](Self::eps) | `1e-3` | Smallest penalty of the default grid relative to the largest | `(0, 1)` |
/// | [n_folds](Self::n_folds) | `5` | Number of folds | `[2, n_samples]` |
/// | [alphas](Self::alphas) | none | Explicit penalties, replaces the default grid | non-empty, `[0, inf)` |
///
/// The remaining options (intercept, standardisation, tolerance, iterations) are shared with
/// [`LassoParams`].
#[derive(Clone, Debug, PartialEq)]
pub struct LassoCvParams<F>(pub(crate) LassoCvValidParams<F>);

impl<F: Float> Default for LassoCvParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> LassoCvParams<F> {
    pub fn new() -> LassoCvParams<F> {
        Self(LassoCvValidParams {
            lasso: LassoParams::new().0,
            n_alphas: 100,
            eps: F::cast(1e-3),
            n_folds: 5,
            alphas: None,
        })
    }

    pub fn n_alphas(mut self, n_alphas: usize) -> Self {
        self.0.n_alphas = n_alphas;
        self
    }

    pub fn eps(mut self, eps: F) -> Self {
        self.0.eps = eps;
        self
    }

    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.0.n_folds = n_folds;
        self
    }

    /// Evaluate exactly these penalties instead of the default grid
    pub fn alphas(mut self, alphas: Vec<F>) -> Self {
        self.0.alphas = Some(alphas);
        self
    }

    pub fn with_intercept(mut self, with_intercept: bool) -> Self {
        self.0.lasso.with_intercept = with_intercept;
        self
    }

    pub fn standardize(mut self, standardize: bool) -> Self {
        self.0.lasso.standardize = standardize;
        self
    }

    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.lasso.tolerance = tolerance;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.0.lasso.max_iterations = max_iterations;
        self
    }
}

impl<F: Float> ParamGuard for LassoCvParams<F> {
    type Checked = LassoCvValidParams<F>;
    type Error = LassoError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        check_lasso(&self.0.lasso)?;

        if self.0.n_folds < 2 {
            return Err(LassoError::InvalidFolds(self.0.n_folds));
        }
        match &self.0.alphas {
            Some(alphas) if alphas.is_empty() => return Err(LassoError::EmptyPath),
            Some(alphas) => {
                if let Some(bad) = alphas.iter().find(|a| a.is_nan() || **a < F::zero()) {
                    return Err(LassoError::InvalidPenalty(as_f32(*bad)));
                }
            }
            None => {
                if self.0.n_alphas == 0 {
                    return Err(LassoError::EmptyPath);
                }
                if !(self.0.eps > F::zero() && self.0.eps < F::one()) {
                    return Err(LassoError::InvalidEps(as_f32(self.0.eps)));
                }
            }
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lasso_params() {
        assert!(LassoParams::<f64>::new().check_ref().is_ok());
        assert!(matches!(
            LassoParams::new().penalty(-1.0f64).check(),
            Err(LassoError::InvalidPenalty(_))
        ));
        assert!(matches!(
            LassoParams::new().tolerance(0.0f64).check(),
            Err(LassoError::InvalidTolerance(_))
        ));
        assert!(matches!(
            LassoParams::<f64>::new().max_iterations(0).check(),
            Err(LassoError::InvalidMaxIterations)
        ));
    }

    #[test]
    fn invalid_cv_params() {
        assert!(LassoCvParams::<f64>::new().check_ref().is_ok());
        assert!(matches!(
            LassoCvParams::<f64>::new().n_folds(1).check(),
            Err(LassoError::InvalidFolds(1))
        ));
        assert!(matches!(
            LassoCvParams::new().eps(1.0f64).check(),
            Err(LassoError::InvalidEps(_))
        ));
        assert!(matches!(
            LassoCvParams::<f64>::new().n_alphas(0).check(),
            Err(LassoError::EmptyPath)
        ));
        assert!(matches!(
            LassoCvParams::<f64>::new().alphas(vec![]).check(),
            Err(LassoError::EmptyPath)
        ));
        assert!(LassoCvParams::new().alphas(vec![0.1f64, -0.1]).check().is_err());
        // an explicit grid makes eps irrelevant
        assert!(LassoCvParams::new().alphas(vec![0.1f64]).eps(2.0).check().is_ok());
    }
}
