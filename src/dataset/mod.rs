//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{
    Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1, Ix2, NdFloat,
};

use num_traits::{AsPrimitive, FromPrimitive, NumCast};
use rand::distributions::uniform::SampleUniform;

use std::iter::Sum;

use crate::error::{Error, Result};

mod impl_dataset;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in records of a dataset and,
/// for regression tasks, in the targets as well.
pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Sum
    + AsPrimitive<usize>
    + SampleUniform
    + approx::AbsDiffEq<Epsilon = Self>
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and the continuous response observed for every record. Feature names are optional and are
/// generated on demand when missing.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures)
/// * `targets`: a one-dimensional response with dimensionality (nsamples)
/// * `feature_names`: optional descriptive feature names with dimensionality (nfeatures)
///
/// # Trait bounds
///
/// * `R: Records`: generic over owned feature matrices and views
/// * `T`: generic over owned targets and views
#[derive(Debug, Clone)]
pub struct DatasetBase<R, T>
where
    R: Records,
{
    pub records: R,
    pub targets: T,

    feature_names: Vec<String>,
}

/// Dataset
///
/// The most commonly used type of dataset. It contains a number of records stored as an `Array2`
/// and a single continuous target per record stored as an `Array1`.
pub type Dataset<F> = DatasetBase<Array2<F>, Array1<F>>;

/// DatasetView
///
/// A read only view of a Dataset
pub type DatasetView<'a, F> = DatasetBase<ArrayView2<'a, F>, ArrayView1<'a, F>>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

/// Implement records for NdArrays
impl<F, S: Data<Elem = F>> Records for ArrayBase<S, Ix2> {
    type Elem = F;

    fn nsamples(&self) -> usize {
        self.len_of(Axis(0))
    }

    fn nfeatures(&self) -> usize {
        self.len_of(Axis(1))
    }
}

/// Implement records for references
impl<R: Records> Records for &R {
    type Elem = R::Elem;

    fn nsamples(&self) -> usize {
        (*self).nsamples()
    }

    fn nfeatures(&self) -> usize {
        (*self).nfeatures()
    }
}

/// Check that a response vector matches the number of records
///
/// Every estimator calls this before touching the data, so a mismatch surfaces as
/// [`Error::MismatchedShapes`] instead of an out-of-bounds panic deep inside the solver.
pub fn check_single_target<F, D: Data<Elem = F>, S: Data<Elem = F>>(
    records: &ArrayBase<D, Ix2>,
    targets: &ArrayBase<S, Ix1>,
) -> Result<()> {
    if records.nrows() == 0 {
        return Err(Error::NotEnoughSamples);
    }

    if records.nrows() != targets.len() {
        return Err(Error::MismatchedShapes {
            expected: records.nrows(),
            actual: targets.len(),
        });
    }

    Ok(())
}
