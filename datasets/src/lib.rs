//! `varsel-datasets` generates synthetic regression problems with correlated covariates.
//!
//! ## The Big Picture
//!
//! Variable selection methods differ most when covariates are correlated. This crate builds a
//! structured covariance matrix from three ingredients and draws multivariate normal records from
//! it:
//!
//! * a [`CovariancePattern`], a symmetric boolean matrix telling which pairs of covariates are
//!   associated,
//! * a standard deviation per covariate,
//! * a single association strength shared by all associated pairs.
//!
//! A response is then generated from a known coefficient vector, so every estimator can be judged
//! by whether it recovers the true support.
//!
//! ## Example
//!
//! ```ignore
//! use rand::{rngs::SmallRng, SeedableRng};
//! use varsel_datasets::{CovariancePattern, SyntheticRegression};
//!
//! let mut rng = SmallRng::seed_from_u64(42);
//! let problem = SyntheticRegression::params()
//!     .n_samples(200)
//!     .pattern(CovariancePattern::blocks(&[3, 3]))
//!     .association(0.8)
//!     .coefficients(vec![1.5, 0.0, 0.0, -1.0, 0.0, 0.0])
//!     .noise_std(0.5)
//!     .generate(&mut rng)?;
//! let dataset = problem.dataset();
//! ```
//!
//! A pattern does not guarantee a valid covariance matrix. A full pattern with a strong negative
//! association, for example, is indefinite. [`structured_covariance`] builds the matrix anyway,
//! [`is_positive_semidefinite`] checks it and [`multivariate_normal`] refuses to sample from it.

mod covariance;
mod error;
pub mod generate;

pub use covariance::{is_positive_semidefinite, structured_covariance, CovariancePattern};
pub use error::{DatasetError, Result};
pub use generate::{
    linear_response, multivariate_normal, SyntheticRegression, SyntheticRegressionParams,
    SyntheticRegressionValidParams,
};
