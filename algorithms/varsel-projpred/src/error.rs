use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjPredError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProjPredError {
    #[error("submodel size {max_size} exceeds the limit of {limit} for this dataset")]
    InvalidMaxSize { max_size: usize, limit: usize },
    #[error("{requested} search draws requested, but the reference model has {available}")]
    InvalidSearchDraws { requested: usize, available: usize },
    #[error("no submodel of size {0} on the search path")]
    UnknownSize(usize),
    #[error("reference model has {actual} draws of the linear predictor but {expected} noise draws")]
    MismatchedDraws { expected: usize, actual: usize },
    #[error("selected covariates are linearly dependent, together with the intercept")]
    Collinear,
    #[error("at least 2 samples needed")]
    NotEnoughSamples,
    #[error(transparent)]
    BaseCrate(#[from] varsel::Error),
}
