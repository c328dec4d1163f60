use ndarray::{Array1, Array2, ArrayView2};

use varsel_horseshoe::HorseshoePosterior;

/// A posterior whose predictions submodels are projected onto
///
/// Both methods must agree on the number and order of draws.
pub trait ReferenceModel {
    /// Linear predictor of every draw at the rows of `x`, with shape `(n_draws, n_samples)`
    fn linear_predictor_draws(&self, x: ArrayView2<f64>) -> Array2<f64>;

    /// Noise standard deviation of every draw
    fn sigma_draws(&self) -> Array1<f64>;
}

impl ReferenceModel for HorseshoePosterior {
    fn linear_predictor_draws(&self, x: ArrayView2<f64>) -> Array2<f64> {
        self.predictive_draws(&x)
    }

    fn sigma_draws(&self) -> Array1<f64> {
        HorseshoePosterior::sigma_draws(self)
    }
}
