use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::traits::PredictInplace;

use crate::diagnostics::{effective_sample_size, quantile};
use crate::error::{HorseshoeError, Result};

/// Posterior draws of a horseshoe regression
///
/// Draws of all chains are stacked, chain by chain. Coefficients refer to the original, uncentred
/// covariates.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct HorseshoePosterior {
    pub(crate) coefficient_draws: Array2<f64>,
    pub(crate) intercept_draws: Array1<f64>,
    pub(crate) sigma2_draws: Array1<f64>,
    pub(crate) tau_draws: Array1<f64>,
    pub(crate) lambda_draws: Array2<f64>,
    pub(crate) column_variance: Array1<f64>,
    pub(crate) n_samples: usize,
    pub(crate) n_chains: usize,
    pub(crate) feature_names: Vec<String>,
}

fn check_level(level: f64) -> Result<()> {
    if level > 0.0 && level < 1.0 {
        Ok(())
    } else {
        Err(HorseshoeError::InvalidLevel(level))
    }
}

impl HorseshoePosterior {
    /// Coefficient draws with shape `(n_draws, n_features)`
    pub fn coefficient_draws(&self) -> &Array2<f64> {
        &self.coefficient_draws
    }

    pub fn intercept_draws(&self) -> &Array1<f64> {
        &self.intercept_draws
    }

    /// Draws of the noise variance
    pub fn sigma2_draws(&self) -> &Array1<f64> {
        &self.sigma2_draws
    }

    /// Draws of the noise standard deviation
    pub fn sigma_draws(&self) -> Array1<f64> {
        self.sigma2_draws.mapv(f64::sqrt)
    }

    /// Draws of the global shrinkage scale
    pub fn tau_draws(&self) -> &Array1<f64> {
        &self.tau_draws
    }

    /// Draws of the local shrinkage scales with shape `(n_draws, n_features)`
    pub fn lambda_draws(&self) -> &Array2<f64> {
        &self.lambda_draws
    }

    /// Total number of draws over all chains
    pub fn n_draws(&self) -> usize {
        self.coefficient_draws.nrows()
    }

    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn posterior_mean(&self) -> Array1<f64> {
        self.coefficient_draws.sum_axis(Axis(0)) / self.n_draws() as f64
    }

    pub fn posterior_sd(&self) -> Array1<f64> {
        self.coefficient_draws.std_axis(Axis(0), 1.0)
    }

    pub fn intercept_mean(&self) -> f64 {
        self.intercept_draws.sum() / self.n_draws() as f64
    }

    /// Equal-tailed credible intervals of every coefficient
    ///
    /// Returns an array of shape `(n_features, 2)` with the `(1 - level) / 2` and
    /// `(1 + level) / 2` quantiles of the draws.
    pub fn credible_intervals(&self, level: f64) -> Result<Array2<f64>> {
        check_level(level)?;
        let (lo, hi) = ((1.0 - level) / 2.0, (1.0 + level) / 2.0);

        let mut intervals = Array2::zeros((self.coefficient_draws.ncols(), 2));
        for (mut row, draws) in intervals
            .rows_mut()
            .into_iter()
            .zip(self.coefficient_draws.columns())
        {
            row[0] = quantile(&draws, lo);
            row[1] = quantile(&draws, hi);
        }

        Ok(intervals)
    }

    /// Posterior mean of the shrinkage factor of every coefficient
    ///
    /// `kappa_j = 1 / (1 + n s_j^2 lambda_j^2 tau^2)` with `s_j^2` the variance of column `j`.
    /// Values near one mean the coefficient is shrunk to zero, values near zero mean it is left
    /// alone.
    pub fn shrinkage_factors(&self) -> Array1<f64> {
        let n = self.coefficient_draws.nrows();
        let n_samples = self.n_samples as f64;

        let mut kappa = Array1::zeros(self.column_variance.len());
        for (lambda, tau) in self.lambda_draws.rows().into_iter().zip(self.tau_draws.iter()) {
            kappa += &lambda
                .iter()
                .zip(self.column_variance.iter())
                .map(|(l, s2)| 1.0 / (1.0 + n_samples * s2 * (l * tau).powi(2)))
                .collect::<Array1<f64>>();
        }

        kappa / n as f64
    }

    /// Effective sample size of every coefficient, summed over chains
    pub fn effective_sample_size(&self) -> Array1<f64> {
        let per_chain = self.n_draws() / self.n_chains;

        self.coefficient_draws
            .columns()
            .into_iter()
            .map(|draws| {
                (0..self.n_chains)
                    .map(|c| {
                        let chain = draws.slice(ndarray::s![c * per_chain..(c + 1) * per_chain]);
                        effective_sample_size(&chain)
                    })
                    .sum()
            })
            .collect()
    }

    /// Indices of the coefficients whose credible interval excludes zero
    pub fn selected(&self, level: f64) -> Result<Vec<usize>> {
        let intervals = self.credible_intervals(level)?;

        Ok(intervals
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, ci)| ci[0] > 0.0 || ci[1] < 0.0)
            .map(|(j, _)| j)
            .collect())
    }

    /// Linear predictor of every draw with shape `(n_draws, n_samples)`
    pub fn predictive_draws<D: Data<Elem = f64>>(&self, x: &ArrayBase<D, Ix2>) -> Array2<f64> {
        let mut draws = self.coefficient_draws.dot(&x.t());
        for (mut row, b) in draws.rows_mut().into_iter().zip(self.intercept_draws.iter()) {
            row += *b;
        }

        draws
    }
}

impl<D: Data<Elem = f64>> PredictInplace<ArrayBase<D, Ix2>, Array1<f64>> for HorseshoePosterior {
    /// Predict with the posterior mean of intercept and coefficients
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<f64>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        *y = x.dot(&self.posterior_mean()) + self.intercept_mean();
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<f64> {
        Array1::zeros(x.nrows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::SmallRng, SeedableRng};
    use varsel::traits::{Fit, Predict};
    use varsel_datasets::{CovariancePattern, SyntheticRegression};

    use crate::HorseshoeParams;

    fn sparse_problem() -> SyntheticRegression {
        let mut rng = SmallRng::seed_from_u64(42);
        SyntheticRegression::params()
            .n_samples(100)
            .pattern(CovariancePattern::chain(8))
            .association(0.3)
            .coefficients(vec![3.0, 0.0, 0.0, -2.0, 0.0, 0.0, 0.0, 0.0])
            .intercept(1.0)
            .noise_std(1.0)
            .generate(&mut rng)
            .unwrap()
    }

    fn posterior(problem: &SyntheticRegression) -> HorseshoePosterior {
        HorseshoeParams::new()
            .n_draws(1000)
            .burn_in(500)
            .seed(7)
            .fit(problem.dataset())
            .unwrap()
    }

    #[test]
    fn strong_signals_survive_and_nulls_shrink() {
        let problem = sparse_problem();
        let posterior = posterior(&problem);
        let mean = posterior.posterior_mean();

        assert_abs_diff_eq!(mean[0], 3.0, epsilon = 0.4);
        assert_abs_diff_eq!(mean[3], -2.0, epsilon = 0.4);
        for j in [1, 2, 4, 5, 6, 7] {
            assert!(mean[j].abs() < 0.25, "coefficient {} has mean {}", j, mean[j]);
        }
        assert_abs_diff_eq!(posterior.intercept_mean(), 1.0, epsilon = 0.4);

        let kappa = posterior.shrinkage_factors();
        assert!(kappa.iter().all(|k| *k > 0.0 && *k < 1.0));
        assert!(kappa[0] < kappa[1]);
        assert!(kappa[3] < kappa[5]);

        let selected = posterior.selected(0.95).unwrap();
        assert!(selected.contains(&0));
        assert!(selected.contains(&3));
    }

    #[test]
    fn seed_makes_draws_reproducible() {
        let problem = sparse_problem();
        let params = HorseshoeParams::new().n_draws(50).burn_in(10).seed(3);

        let a = params.fit(problem.dataset()).unwrap();
        let b = params.fit(problem.dataset()).unwrap();
        assert_eq!(a, b);

        let c = params.clone().seed(4).fit(problem.dataset()).unwrap();
        assert_ne!(a.coefficient_draws(), c.coefficient_draws());
    }

    #[test]
    fn summaries_are_consistent() {
        let problem = sparse_problem();
        let posterior = posterior(&problem);
        let mean = posterior.posterior_mean();

        let ci = posterior.credible_intervals(0.9).unwrap();
        assert_eq!(ci.dim(), (8, 2));
        for (j, row) in ci.rows().into_iter().enumerate() {
            assert!(row[0] <= mean[j] && mean[j] <= row[1]);
        }
        assert!(posterior.credible_intervals(1.0).is_err());
        assert!(posterior.selected(0.0).is_err());

        assert!(posterior.posterior_sd().iter().all(|s| *s > 0.0));
        let ess = posterior.effective_sample_size();
        assert!(ess.iter().all(|e| *e > 10.0 && *e <= 1000.0));

        // the posterior mean prediction is the average of the predictive draws
        let records = problem.dataset().records();
        let draws = posterior.predictive_draws(records);
        assert_eq!(draws.dim(), (1000, 100));
        let prediction: Array1<f64> = posterior.predict(records);
        assert_abs_diff_eq!(prediction, draws.mean_axis(Axis(0)).unwrap(), epsilon = 1e-8);
    }

    #[test]
    fn chains_are_stacked() {
        let problem = sparse_problem();
        let posterior = HorseshoeParams::new()
            .n_draws(200)
            .burn_in(100)
            .n_chains(3)
            .fit(problem.dataset())
            .unwrap();

        assert_eq!(posterior.n_chains(), 3);
        assert_eq!(posterior.n_draws(), 600);
        assert_eq!(posterior.lambda_draws().dim(), (600, 8));
        assert_eq!(posterior.sigma_draws().len(), 600);
        assert_eq!(posterior.feature_names()[0], "x1");
        assert!(posterior.effective_sample_size().iter().all(|e| *e <= 600.0));
    }
}
