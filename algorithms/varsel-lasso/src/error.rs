use thiserror::Error;

pub type Result<T> = std::result::Result<T, LassoError>;

#[derive(Debug, Error)]
pub enum LassoError {
    #[error("penalty should be positive, but is {0}")]
    InvalidPenalty(f32),
    #[error("tolerance should be positive, but is {0}")]
    InvalidTolerance(f32),
    #[error("at least one iteration is needed")]
    InvalidMaxIterations,
    #[error("ratio of smallest to largest penalty should be in (0, 1), but is {0}")]
    InvalidEps(f32),
    #[error("at least one penalty is needed on a path")]
    EmptyPath,
    #[error("number of folds should be at least two, but is {0}")]
    InvalidFolds(usize),
    #[error(transparent)]
    BaseCrate(#[from] varsel::Error),
}
