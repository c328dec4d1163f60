use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("invalid covariance pattern: {0}")]
    InvalidPattern(String),
    #[error("standard deviations must be positive and finite, got {0}")]
    InvalidStandardDeviation(f64),
    #[error("association must be finite and in [-1, 1], got {0}")]
    InvalidAssociation(f64),
    #[error("noise standard deviation must be non-negative and finite, got {0}")]
    InvalidNoise(f64),
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("at least one sample is required")]
    NoSamples,
    #[error("covariance matrix is not positive semi-definite")]
    NotPositiveSemidefinite,
    #[error("expected {expected} values, found {actual}")]
    MismatchedLength { expected: usize, actual: usize },
    #[error(transparent)]
    BaseCrate(#[from] varsel::Error),
}
