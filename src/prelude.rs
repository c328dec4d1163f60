//! varsel prelude.
//!
//! This module contains the most used types, type aliases, traits and
//! functions that you can import easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{Error, Result};

#[doc(no_inline)]
pub use crate::traits::*;

#[doc(no_inline)]
pub use crate::dataset::{Dataset, DatasetBase, DatasetView, Float, Records};

#[doc(no_inline)]
pub use crate::metrics_regression::SingleTargetRegression;

#[doc(no_inline)]
pub use crate::correlation::{condition_number, variance_inflation_factors, PearsonCorrelation};

#[doc(no_inline)]
pub use crate::preprocessing::Standardization;

#[doc(no_inline)]
pub use crate::param_guard::ParamGuard;
