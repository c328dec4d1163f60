//! `varsel-reduction` regresses on principal components instead of the raw covariates.
//!
//! * [`Pca`] rotates centred records onto the eigenvectors of their sample covariance
//! * [`Pcr`] regresses the response on the leading components and reports the equivalent
//!   coefficients of the original covariates
//!
//! Strongly correlated covariates share most of their variance with a single component, so a
//! handful of components often predicts as well as the full least squares fit.
mod error;
mod pca;
mod pcr;

pub use error::{ReductionError, Result};
pub use pca::{Pca, PcaParams, PcaValidParams};
pub use pcr::{Pcr, PcrParams, PcrValidParams};
