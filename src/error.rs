//! Error types in varsel
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("algorithm not converged {0}")]
    NotConverged(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("not enough samples")]
    NotEnoughSamples,
    #[error("mismatched shapes: expected {expected} elements, found {actual}")]
    MismatchedShapes { expected: usize, actual: usize },
    #[error(transparent)]
    Linalg(#[from] linfa_linalg::LinalgError),
}
