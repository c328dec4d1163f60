use thiserror::Error;

use varsel_linear::LinearError;

pub type Result<T> = std::result::Result<T, ReductionError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReductionError {
    #[error("At least 2 samples needed")]
    NotEnoughSamples,
    #[error("Target dimension of the projection must be positive")]
    NonPositiveEmbeddingSize,
    #[error("Target dimension {0} is larger than the number of features {1}.")]
    DimensionIncrease(usize, usize),
    #[error(transparent)]
    Regression(#[from] LinearError),
    #[error(transparent)]
    BaseCrate(#[from] varsel::Error),
}
