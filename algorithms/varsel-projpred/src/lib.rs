//! `varsel-projpred` selects variables by projecting a reference posterior onto submodels.
//!
//! ## The Big Picture
//!
//! A shrinkage posterior such as the horseshoe predicts well, but keeps every covariate. Projection
//! predictive selection asks which small submodel makes almost the same predictions. Every draw of
//! the reference model is projected onto a submodel by fitting its linear predictor with least
//! squares on the submodel's covariates, the lost fit is added to the noise,
//!
//! ```text
//! sigma_perp^2 = sigma^2 + |mu - mu_S|^2 / n
//! ```
//!
//! A forward search adds one covariate at a time, always the one which brings the projection
//! closest to the reference fit. Every submodel on the path is then scored by its expected log
//! predictive density (elpd) relative to the reference model, and the smallest submodel within one
//! standard error of the reference is suggested.
//!
//! ```ignore
//! use varsel::traits::Fit;
//! use varsel_horseshoe::HorseshoeParams;
//! use varsel_projpred::ProjPredParams;
//!
//! let posterior = HorseshoeParams::new().fit(&dataset)?;
//! let path = ProjPredParams::new(&posterior).max_size(5).fit(&dataset)?;
//! println!("{}", path);
//! let submodel = path.projection(path.suggest_size())?;
//! ```
mod error;
mod hyperparams;
mod projection;
mod reference;
mod search;

pub use error::{ProjPredError, Result};
pub use hyperparams::{ProjPredParams, ProjPredValidParams};
pub use projection::SubmodelProjection;
pub use reference::ReferenceModel;
pub use search::{SearchPath, SubmodelSummary};
