//! `varsel-lasso` fits L1 penalised linear regressions.
//!
//! ## The Big Picture
//!
//! The Lasso shrinks coefficients towards zero and sets many of them exactly to zero, so fitting
//! it is a variable selection in itself. The penalty decides how many covariates survive. This
//! crate provides
//!
//! * [`Lasso`], a single fit at a fixed penalty,
//! * [`lasso_path`], warm-started fits along a decreasing sequence of penalties,
//! * [`LassoCvParams`], k-fold cross validation over the path with the minimum and one-standard-error
//!   rules for choosing the penalty.
//!
//! On correlated covariates the Lasso tends to pick one member of a correlated group and drop
//! the others, which the examples in this crate demonstrate.

use ndarray::Array1;
use varsel::Float;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod algorithm;
mod cv;
mod error;
mod hyperparams;
mod path;

pub use cv::LassoCvResult;
pub use error::{LassoError, Result};
pub use hyperparams::{LassoCvParams, LassoCvValidParams, LassoParams, LassoValidParams};
pub use path::{alpha_grid, alpha_max, lasso_path, LassoPath};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
/// Lasso model
///
/// This struct contains the parameters of a fitted Lasso model. This includes the coefficients on
/// the scale of the original columns, the (optional) intercept, the duality gap and the number of
/// sweeps needed in the computation.
///
/// ## Model implementation
///
/// The coordinate descent algorithm optimizes each coefficient seperately, holding all the
/// others fixed. This cycles until the duality gap falls below the tolerance or the maximum
/// number of iterations is reached.
///
/// See also:
/// * [Regularization Paths for Generalized Linear Models via Coordinate
/// Descent](http://www.jstatsoft.org/v33/i01/paper)
#[derive(Debug, Clone, PartialEq)]
pub struct Lasso<F> {
    parameters: Array1<F>,
    intercept: F,
    penalty: F,
    duality_gap: F,
    n_steps: u32,
}

impl<F: Float> Lasso<F> {
    /// Create a default parameter set for construction of a Lasso model
    ///
    /// By default, an intercept will be fitted and the columns are not standardised.
    pub fn params() -> LassoParams<F> {
        LassoParams::new()
    }

    /// Create a default parameter set for cross validating the penalty
    pub fn cv() -> LassoCvParams<F> {
        LassoCvParams::new()
    }
}
