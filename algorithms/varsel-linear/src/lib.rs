//!
//! `varsel-linear` fits ordinary least squares regressions and reports the classical inference
//! for every coefficient.
//!
//! ## The Big Picture
//!
//! OLS is the baseline every variable selection method is compared against. On correlated
//! covariates its estimates stay unbiased, but their standard errors grow with the variance
//! inflation of each covariate, so true effects drown in noise. The fitted model exposes
//! standard errors, t statistics, two-sided p-values and confidence intervals to make that
//! visible.
//!
//! ## Examples
//!
//! There is an usage example in the `examples/` directory. To run, use:
//!
//! ```bash
//! $ cargo run --example collinearity
//! ```

mod error;
mod inference;
mod ols;

pub use error::*;
pub use inference::CoefficientSummary;
pub use ols::*;
