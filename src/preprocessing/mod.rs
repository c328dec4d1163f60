//! Column standardisation
//!
//! Penalised and component-based regressions are not invariant to the scale of the covariates.
//! [`Standardization`] centres and scales columns and maps coefficients estimated on the
//! standardised columns back to the original scale.

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Float;

/// Column means and scales learned from a feature matrix
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Standardization<F> {
    mean: Array1<F>,
    scale: Array1<F>,
}

impl<F: Float> Standardization<F> {
    /// Learn means and (population) standard deviations of every column
    ///
    /// Columns with zero variance keep a scale of one, so they are only centred.
    pub fn fit<D: Data<Elem = F>>(x: &ArrayBase<D, Ix2>) -> Result<Self> {
        let mean = x.mean_axis(Axis(0)).ok_or(Error::NotEnoughSamples)?;
        let scale = x
            .var_axis(Axis(0), F::zero())
            .mapv(|v| if v > F::epsilon() { v.sqrt() } else { F::one() });

        Ok(Standardization { mean, scale })
    }

    /// Learn column means only, scales are one
    pub fn centering<D: Data<Elem = F>>(x: &ArrayBase<D, Ix2>) -> Result<Self> {
        let mean = x.mean_axis(Axis(0)).ok_or(Error::NotEnoughSamples)?;
        let scale = Array1::ones(mean.len());

        Ok(Standardization { mean, scale })
    }

    /// Scale columns by their root mean square without centring them
    ///
    /// Used when a model has no intercept, so the columns must keep their origin.
    pub fn scaling<D: Data<Elem = F>>(x: &ArrayBase<D, Ix2>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(Error::NotEnoughSamples);
        }
        let n = F::cast(x.nrows());
        let scale = x.map_axis(Axis(0), |col| {
            let rms = (col.dot(&col) / n).sqrt();
            if rms > F::epsilon() {
                rms
            } else {
                F::one()
            }
        });

        Ok(Standardization {
            mean: Array1::zeros(x.ncols()),
            scale,
        })
    }

    /// Identity transformation for `nfeatures` columns
    pub fn identity(nfeatures: usize) -> Self {
        Standardization {
            mean: Array1::zeros(nfeatures),
            scale: Array1::ones(nfeatures),
        }
    }

    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<F> {
        &self.scale
    }

    /// Centre and scale the columns of `x`
    pub fn transform<D: Data<Elem = F>>(&self, x: &ArrayBase<D, Ix2>) -> Array2<F> {
        (x - &self.mean) / &self.scale
    }

    /// Map coefficients of a model fitted on transformed columns back to the original columns
    ///
    /// A model `y = b + z w` with `z = (x - mean) / scale` equals
    /// `y = (b - mean . w') + x w'` with `w' = w / scale`.
    pub fn unscale_coefficients<D: Data<Elem = F>>(
        &self,
        params: &ArrayBase<D, Ix1>,
        intercept: F,
    ) -> (Array1<F>, F) {
        let params = params / &self.scale;
        let intercept = intercept - self.mean.dot(&params);

        (params, intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn standardized_columns_have_unit_variance() {
        let x = array![[1., 10., 3.], [2., 20., 3.], [3., 30., 3.], [4., 40., 3.]];
        let std = Standardization::fit(&x).unwrap();
        let z = std.transform(&x);

        assert_abs_diff_eq!(z.mean_axis(Axis(0)).unwrap(), array![0., 0., 0.], epsilon = 1e-12);
        assert_abs_diff_eq!(z.var_axis(Axis(0), 0.), array![1., 1., 0.], epsilon = 1e-12);
        // constant column is only centred
        assert_abs_diff_eq!(std.scale()[2], 1.0);
    }

    #[test]
    fn coefficients_are_mapped_back() {
        let x = array![[1., 5.], [2., 3.], [4., 8.], [7., 1.]];
        let std = Standardization::fit(&x).unwrap();
        let z = std.transform(&x);

        let w = array![0.5, -2.0];
        let b = 1.5;
        let (w_orig, b_orig) = std.unscale_coefficients(&w, b);

        assert_abs_diff_eq!(z.dot(&w) + b, x.dot(&w_orig) + b_orig, epsilon = 1e-12);
    }

    #[test]
    fn scaling_keeps_the_origin() {
        let x = array![[3., 0.], [-4., 0.]];
        let std = Standardization::scaling(&x).unwrap();

        assert_abs_diff_eq!(std.mean(), &array![0., 0.]);
        assert_abs_diff_eq!(std.scale(), &array![12.5f64.sqrt(), 1.], epsilon = 1e-12);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        assert!(Standardization::<f64>::fit(&Array2::zeros((0, 3))).is_err());
    }
}
