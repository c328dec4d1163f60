//! An error when fitting a least squares model
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinearError>;

/// An error when fitting a least squares model
#[derive(Error, Debug)]
pub enum LinearError {
    #[error("{samples} samples cannot identify {parameters} parameters with residual degrees of freedom")]
    NotEnoughSamples { samples: usize, parameters: usize },
    #[error("confidence level {0} not in (0, 1)")]
    InvalidLevel(f64),
    #[error("statistics: {0}")]
    Statistics(#[from] statrs::StatsError),
    #[error(transparent)]
    BaseCrate(#[from] varsel::Error),
}
