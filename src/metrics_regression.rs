//! Common metrics for regression
//!
//! This module implements common comparison metrices for continuous variables.

use ndarray::{ArrayBase, Data, Ix1};

use crate::error::{Error, Result};
use crate::Float;

/// Regression metrices trait for single targets.
///
/// It is possible to compute the listed mectrics between:
/// * One-dimensional array - One-dimensional array
///
/// All metrics fail with [`Error::MismatchedShapes`] if both arrays differ in length and
/// with [`Error::NotEnoughSamples`] if they are empty.
pub trait SingleTargetRegression<F: Float> {
    /// Maximal error between two continuous variables
    fn max_error<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>) -> Result<F>;
    /// Mean error between two continuous variables
    fn mean_absolute_error<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>)
        -> Result<F>;
    /// Mean squared error between two continuous variables
    fn mean_squared_error<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>) -> Result<F>;
    /// R squared coefficient, is the proportion of the variance in the dependent variable that is
    /// predictable from the independent variable.
    ///
    /// To evaluate the accuracy of a prediction, use
    /// ```ignore
    /// prediction.r2(&ground_truth)
    /// ```
    fn r2<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>) -> Result<F>;
    /// Same as R-Squared but with biased variance
    fn explained_variance<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>)
        -> Result<F>;
}

fn check_lengths<F, D1: Data<Elem = F>, D2: Data<Elem = F>>(
    a: &ArrayBase<D1, Ix1>,
    b: &ArrayBase<D2, Ix1>,
) -> Result<()> {
    if a.len() != b.len() {
        Err(Error::MismatchedShapes {
            expected: a.len(),
            actual: b.len(),
        })
    } else if a.is_empty() {
        Err(Error::NotEnoughSamples)
    } else {
        Ok(())
    }
}

impl<F: Float, S: Data<Elem = F>> SingleTargetRegression<F> for ArrayBase<S, Ix1> {
    fn max_error<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>) -> Result<F> {
        check_lengths(self, compare_to)?;

        Ok((self - compare_to)
            .iter()
            .map(|x| x.abs())
            .fold(F::neg_infinity(), F::max))
    }

    fn mean_absolute_error<D: Data<Elem = F>>(
        &self,
        compare_to: &ArrayBase<D, Ix1>,
    ) -> Result<F> {
        check_lengths(self, compare_to)?;

        let n = F::cast(self.len());
        Ok((self - compare_to).mapv(|x| x.abs()).sum() / n)
    }

    fn mean_squared_error<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>) -> Result<F> {
        check_lengths(self, compare_to)?;

        let n = F::cast(self.len());
        Ok((self - compare_to).mapv(|x| x * x).sum() / n)
    }

    // r2 = 1 - sum((pred_i - y_i)^2)/sum((mean_y - y_i)^2)
    // if the mean is of `compare_to`, then the denominator
    // should compare `compare_to` and the mean, and not self and the mean
    fn r2<D: Data<Elem = F>>(&self, compare_to: &ArrayBase<D, Ix1>) -> Result<F> {
        check_lengths(self, compare_to)?;

        let n = F::cast(compare_to.len());
        let mean = compare_to.sum() / n;

        Ok(F::one()
            - (self - compare_to).mapv(|x| x * x).sum()
                / (compare_to.mapv(|x| (x - mean) * (x - mean)).sum() + F::cast(1e-10)))
    }

    fn explained_variance<D: Data<Elem = F>>(
        &self,
        compare_to: &ArrayBase<D, Ix1>,
    ) -> Result<F> {
        check_lengths(self, compare_to)?;

        let n = F::cast(compare_to.len());
        let diff = self - compare_to;

        let mean = compare_to.sum() / n;
        let mean_error = diff.sum() / n;

        Ok(F::one()
            - diff.mapv(|x| (x - mean_error) * (x - mean_error)).sum()
                / (compare_to.mapv(|x| (x - mean) * (x - mean)).sum() + F::cast(1e-10)))
    }
}
