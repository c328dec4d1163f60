//! `varsel-horseshoe` fits Bayesian linear regressions with a horseshoe prior.
//!
//! ## The Big Picture
//!
//! The horseshoe prior places an individual half-Cauchy scale on every coefficient and a shared
//! half-Cauchy scale on all of them,
//!
//! ```text
//! y = b0 + X beta + eps,          eps ~ N(0, sigma^2)
//! beta_j ~ N(0, lambda_j^2 tau^2 sigma^2),  lambda_j ~ C+(0, 1),  tau ~ C+(0, tau0)
//! ```
//!
//! Its spike at zero pulls irrelevant coefficients towards zero, its heavy tails leave large
//! effects almost untouched. Unlike the Lasso no coefficient becomes exactly zero, variables are
//! selected by their credible intervals or by projection predictive selection on top of the
//! posterior.
//!
//! The posterior is sampled with a Gibbs sampler, see [`HorseshoeParams`] for its settings and
//! [`HorseshoePosterior`] for the summaries.
//!
//! ```ignore
//! use varsel::traits::Fit;
//! use varsel_horseshoe::HorseshoeParams;
//!
//! let posterior = HorseshoeParams::new().n_draws(2000).seed(1).fit(&dataset)?;
//! let intervals = posterior.credible_intervals(0.95)?;
//! ```
mod diagnostics;
mod error;
mod gibbs;
mod hyperparams;
mod posterior;

pub use error::{HorseshoeError, Result};
pub use hyperparams::{HorseshoeParams, HorseshoeValidParams};
pub use posterior::HorseshoePosterior;
