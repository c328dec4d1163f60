use ndarray_rand::rand_distr::GammaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HorseshoeError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HorseshoeError {
    #[error("number of retained draws must be positive")]
    InvalidDraws,
    #[error("thinning interval must be at least 1")]
    InvalidThin,
    #[error("number of chains must be positive")]
    InvalidChains,
    #[error("global scale must be positive and finite, got {0}")]
    InvalidGlobalScale(f64),
    #[error("credible level must be in (0, 1), got {0}")]
    InvalidLevel(f64),
    #[error("at least 2 samples needed")]
    NotEnoughSamples,
    #[error("invalid gamma distribution in the sampler: {0}")]
    Gamma(#[from] GammaError),
    #[error(transparent)]
    BaseCrate(#[from] varsel::Error),
}
