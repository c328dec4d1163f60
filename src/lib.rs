//! `varsel` is a small toolkit for comparing variable-selection techniques on correlated
//! covariates.
//!
//! The root crate carries the shared plumbing: the [`Dataset`] type, the
//! [`Fit`](traits::Fit)/[`Predict`](traits::Predict) traits, hyper-parameter checking with
//! [`ParamGuard`], regression metrics and collinearity diagnostics. The estimators live in
//! their own crates next to it:
//!
//! * `varsel-linear`: ordinary least squares with coefficient inference
//! * `varsel-lasso`: Lasso by coordinate descent, with regularisation paths and k-fold selection
//! * `varsel-reduction`: principal component analysis and principal-components regression
//! * `varsel-horseshoe`: Bayesian linear regression with a horseshoe prior, fitted by Gibbs sampling
//! * `varsel-projpred`: projection predictive variable selection on top of a reference posterior
//!
//! Synthetic, correlated covariates for all of them come from `varsel-datasets`.
//!
//! ## Example
//!
//! ```ignore
//! use varsel::prelude::*;
//! use varsel_datasets::{CovariancePattern, SyntheticRegression};
//!
//! let problem = SyntheticRegression::params()
//!     .pattern(CovariancePattern::blocks(&[3, 3]))
//!     .association(0.8)
//!     .coefficients(vec![1.0, 0.0, 0.0, -0.5, 0.0, 0.0])
//!     .generate(&mut rng)?;
//!
//! let vif = variance_inflation_factors(problem.dataset().records())?;
//! ```

pub mod correlation;
pub mod dataset;
pub mod error;
pub mod linalg;
mod metrics_regression;
mod param_guard;
pub mod prelude;
pub mod preprocessing;
pub mod traits;

#[cfg(feature = "benchmarks")]
pub mod benchmarks;

pub use dataset::{Dataset, DatasetBase, DatasetView, Float};
pub use error::Error;
pub use param_guard::ParamGuard;

/// Common metrics functions for regression
pub mod metrics {
    pub use crate::metrics_regression::SingleTargetRegression;
}
