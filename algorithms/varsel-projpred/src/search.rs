use std::fmt;

use log::debug;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1, Ix2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::dataset::{check_single_target, DatasetBase};
use varsel::traits::Fit;

use crate::error::{ProjPredError, Result};
use crate::hyperparams::ProjPredValidParams;
use crate::projection::{design, discrepancy, SubmodelProjection};
use crate::reference::ReferenceModel;

/// Submodels closer than this to the reference model count as equally good
const ELPD_TOLERANCE: f64 = 1e-9;

/// Predictive performance of the submodel with the first `size` variables of the search path
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SubmodelSummary {
    pub size: usize,
    /// Expected log predictive density summed over the evaluation samples
    pub elpd: f64,
    pub elpd_se: f64,
    /// Difference in elpd to the reference model, negative when the submodel is worse
    pub elpd_diff: f64,
    pub se_diff: f64,
    /// Mean squared error of the mean prediction
    pub mse: f64,
}

/// Outcome of a projection predictive forward search
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    solution_order: Vec<usize>,
    feature_names: Vec<String>,
    summaries: Vec<SubmodelSummary>,
    reference_elpd: f64,
    projections: Vec<SubmodelProjection>,
}

impl SearchPath {
    /// Variable indices in the order they entered the submodel
    pub fn solution_order(&self) -> &[usize] {
        &self.solution_order
    }

    pub fn solution_names(&self) -> Vec<&str> {
        self.solution_order
            .iter()
            .map(|j| self.feature_names[*j].as_str())
            .collect()
    }

    /// One summary for every size from zero to the maximal size
    pub fn summaries(&self) -> &[SubmodelSummary] {
        &self.summaries
    }

    pub fn reference_elpd(&self) -> f64 {
        self.reference_elpd
    }

    /// Smallest submodel whose elpd is within one standard error of the reference model
    ///
    /// Falls back to the largest submodel when none gets close enough.
    pub fn suggest_size(&self) -> usize {
        self.summaries
            .iter()
            .find(|s| s.elpd_diff + s.se_diff >= -ELPD_TOLERANCE)
            .or_else(|| self.summaries.last())
            .map(|s| s.size)
            .unwrap_or(0)
    }

    /// Projected draws of the submodel with `size` variables
    pub fn projection(&self, size: usize) -> Result<&SubmodelProjection> {
        self.projections
            .get(size)
            .ok_or(ProjPredError::UnknownSize(size))
    }
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4} {:<10} {:>10} {:>8} {:>10} {:>8} {:>8}",
            "size", "added", "elpd", "se", "diff", "se_diff", "mse"
        )?;
        for summary in &self.summaries {
            let added = match summary.size {
                0 => "(intercept)",
                size => self.feature_names[self.solution_order[size - 1]].as_str(),
            };
            writeln!(
                f,
                "{:>4} {:<10} {:>10.2} {:>8.2} {:>10.2} {:>8.2} {:>8.4}",
                summary.size,
                added,
                summary.elpd,
                summary.elpd_se,
                summary.elpd_diff,
                summary.se_diff,
                summary.mse
            )?;
        }
        write!(f, "reference elpd {:.2}", self.reference_elpd)
    }
}

/// Log density of every target under every draw, averaged over draws on the probability scale
///
/// `draws` has shape `(n_draws, n_samples)`, the result holds one value per sample.
fn pointwise_lpd(draws: &Array2<f64>, sigma: &Array1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
    let n_draws = draws.nrows() as f64;

    y.iter()
        .zip(draws.columns())
        .map(|(target, mu)| {
            let log_density = mu
                .iter()
                .zip(sigma.iter())
                .map(|(m, s)| {
                    let z = (target - m) / s;
                    -0.5 * z * z - s.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln()
                })
                .collect::<Vec<_>>();
            let max = log_density.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let sum = log_density.iter().map(|l| (l - max).exp()).sum::<f64>();

            max + sum.ln() - n_draws.ln()
        })
        .collect()
}

/// Sum and standard error of a pointwise quantity
fn total_with_se(pointwise: &Array1<f64>) -> (f64, f64) {
    let n = pointwise.len() as f64;
    let se = if pointwise.len() > 1 {
        (n * pointwise.var(1.0)).sqrt()
    } else {
        0.0
    };

    (pointwise.sum(), se)
}

/// Greedily add the variable which brings the submodel closest to `targets`
///
/// Candidates with singular normal equations are never chosen. The search ends early when no
/// remaining candidate can be added, so the path may be shorter than `max_size`.
fn forward_search(x: ArrayView2<f64>, targets: ArrayView2<f64>, max_size: usize) -> Vec<usize> {
    let mut order: Vec<usize> = Vec::with_capacity(max_size);
    let mut remaining: Vec<usize> = (0..x.ncols()).collect();

    while order.len() < max_size {
        let mut best: Option<(usize, f64)> = None;
        for (position, candidate) in remaining.iter().enumerate() {
            let mut variables = order.clone();
            variables.push(*candidate);

            let distance = design(&x, &variables)
                .and_then(|z| discrepancy(&z, targets))
                .map(|d| d.sum())
                .unwrap_or(f64::INFINITY);
            if distance.is_finite() && best.map_or(true, |(_, d)| distance < d) {
                best = Some((position, distance));
            }
        }

        match best {
            Some((position, distance)) => {
                let chosen = remaining.remove(position);
                debug!(
                    "projpred step {}: added variable {} (discrepancy {:.4})",
                    order.len() + 1,
                    chosen,
                    distance
                );
                order.push(chosen);
            }
            None => {
                debug!(
                    "projpred search stopped after {} variables, every remaining candidate is collinear",
                    order.len()
                );
                break;
            }
        }
    }

    order
}

impl<'a, M: ReferenceModel> ProjPredValidParams<'a, M> {
    /// Fitted values driving the forward search, one column per search draw
    fn search_targets(&self, fitted: &Array2<f64>) -> Result<Array2<f64>> {
        match self.n_search_draws {
            None => {
                let mean = fitted
                    .mean_axis(Axis(0))
                    .ok_or(ProjPredError::NotEnoughSamples)?;
                Ok(mean.insert_axis(Axis(1)))
            }
            Some(n_search_draws) => {
                let mut rng = Xoshiro256Plus::seed_from_u64(self.seed);
                let indices =
                    rand::seq::index::sample(&mut rng, fitted.nrows(), n_search_draws).into_vec();
                Ok(fitted.select(Axis(0), &indices).reversed_axes())
            }
        }
    }
}

impl<'a, M: ReferenceModel, D: Data<Elem = f64>, T: Data<Elem = f64>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, ProjPredError> for ProjPredValidParams<'a, M>
{
    type Object = SearchPath;

    /// Search the submodels of the covariates the reference model was fitted on
    ///
    /// Every size on the path is projected with all reference draws and evaluated on the
    /// validation data if given, otherwise on the training data.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>) -> Result<SearchPath> {
        let (x, y) = (dataset.records().view(), dataset.targets().view());
        check_single_target(&x, &y)?;
        let (n, p) = x.dim();
        if n < 2 {
            return Err(ProjPredError::NotEnoughSamples);
        }

        let limit = p.min(n - 1);
        let max_size = match self.max_size {
            Some(max_size) if max_size > limit => {
                return Err(ProjPredError::InvalidMaxSize { max_size, limit })
            }
            Some(max_size) => max_size,
            None => limit,
        };

        let fitted = self.reference.linear_predictor_draws(x);
        let sigma = self.reference.sigma_draws();
        if fitted.nrows() != sigma.len() {
            return Err(ProjPredError::MismatchedDraws {
                expected: sigma.len(),
                actual: fitted.nrows(),
            });
        }
        if fitted.ncols() != n {
            return Err(varsel::Error::MismatchedShapes {
                expected: n,
                actual: fitted.ncols(),
            }
            .into());
        }

        let targets = self.search_targets(&fitted)?;
        let solution_order = forward_search(x, targets.view(), max_size);

        let (eval_x, eval_y) = match self.validation {
            Some((records, targets)) => (records.reborrow(), targets.reborrow()),
            None => (x, y),
        };
        if eval_x.ncols() != p {
            return Err(varsel::Error::MismatchedShapes {
                expected: p,
                actual: eval_x.ncols(),
            }
            .into());
        }

        let reference_draws = self.reference.linear_predictor_draws(eval_x);
        let reference_lpd = pointwise_lpd(&reference_draws, &sigma, eval_y);
        let (reference_elpd, _) = total_with_se(&reference_lpd);

        let mut summaries = Vec::with_capacity(max_size + 1);
        let mut projections = Vec::with_capacity(max_size + 1);
        for size in 0..=solution_order.len() {
            let projection = SubmodelProjection::new(x, &solution_order[..size], &fitted, &sigma)?;

            let draws = projection.predictive_draws(&eval_x);
            let lpd = pointwise_lpd(&draws, projection.sigma_draws(), eval_y);
            let (elpd, elpd_se) = total_with_se(&lpd);
            let (elpd_diff, se_diff) = total_with_se(&(&lpd - &reference_lpd));

            let mean = draws
                .mean_axis(Axis(0))
                .ok_or(ProjPredError::NotEnoughSamples)?;
            let mse = (&mean - &eval_y).mapv(|r| r * r).mean().unwrap_or(f64::NAN);

            debug!(
                "projpred size {}: elpd {:.3} (diff {:.3} +- {:.3}), mse {:.4}",
                size, elpd, elpd_diff, se_diff, mse
            );

            summaries.push(SubmodelSummary {
                size,
                elpd,
                elpd_se,
                elpd_diff,
                se_diff,
                mse,
            });
            projections.push(projection);
        }

        Ok(SearchPath {
            solution_order,
            feature_names: dataset.feature_names(),
            summaries,
            reference_elpd,
            projections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use rand::{rngs::SmallRng, SeedableRng};
    use varsel::traits::Predict;
    use varsel::Dataset;
    use varsel_datasets::{CovariancePattern, SyntheticRegression};

    use crate::ProjPredParams;

    /// Reference posterior which only depends on the first and the fourth covariate
    struct SparseReference {
        coefficients: Array2<f64>,
        intercepts: Array1<f64>,
    }

    impl SparseReference {
        fn new(n_draws: usize) -> Self {
            let mut coefficients = Array2::zeros((n_draws, 8));
            for (k, mut row) in coefficients.rows_mut().into_iter().enumerate() {
                let wobble = 0.01 * (k as f64 - (n_draws - 1) as f64 / 2.0);
                row[0] = 2.0 + wobble;
                row[3] = -1.5 - wobble;
            }

            SparseReference {
                coefficients,
                intercepts: Array::linspace(0.9, 1.1, n_draws),
            }
        }
    }

    impl ReferenceModel for SparseReference {
        fn linear_predictor_draws(&self, x: ArrayView2<f64>) -> Array2<f64> {
            self.coefficients.dot(&x.t()) + &self.intercepts.view().insert_axis(Axis(1))
        }

        fn sigma_draws(&self) -> Array1<f64> {
            Array1::ones(self.intercepts.len())
        }
    }

    fn problem(seed: u64) -> SyntheticRegression {
        let mut rng = SmallRng::seed_from_u64(seed);
        SyntheticRegression::params()
            .n_samples(80)
            .pattern(CovariancePattern::chain(8))
            .association(0.4)
            .coefficients(vec![2.0, 0.0, 0.0, -1.5, 0.0, 0.0, 0.0, 0.0])
            .intercept(1.0)
            .noise_std(1.0)
            .generate(&mut rng)
            .unwrap()
    }

    #[test]
    fn lpd_of_a_single_draw_is_the_normal_log_density() {
        let lpd = pointwise_lpd(&array![[0.0, 1.0]], &array![2.0], array![0.0, 3.0].view());

        let c = -(2.0f64).ln() - 0.5 * (2.0 * std::f64::consts::PI).ln();
        assert_abs_diff_eq!(lpd, array![c, c - 0.5], epsilon = 1e-12);
    }

    #[test]
    fn lpd_averages_densities_not_logs() {
        // two draws with densities phi(0) and phi(10), the mixture is dominated by the first
        let lpd = pointwise_lpd(&array![[0.0], [10.0]], &array![1.0, 1.0], array![0.0].view());

        let phi0 = -0.5 * (2.0 * std::f64::consts::PI).ln();
        assert_abs_diff_eq!(lpd[0], phi0 - 2.0f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn true_signals_are_found_first() {
        let problem = problem(42);
        let reference = SparseReference::new(20);

        let path = ProjPredParams::new(&reference).fit(problem.dataset()).unwrap();
        assert_eq!(&path.solution_order()[..2], &[0, 3]);
        assert_eq!(path.solution_names()[..2], ["x1", "x4"]);
        assert_eq!(path.summaries().len(), 9);
        assert_eq!(path.suggest_size(), 2);

        // the reference lies in the span of the second submodel
        let summary = &path.summaries()[2];
        assert_abs_diff_eq!(summary.elpd_diff, 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(summary.elpd, path.reference_elpd(), epsilon = 1e-8);
        assert!(path.summaries()[1].elpd_diff < -1.0);
        assert!(path.summaries()[0].mse > path.summaries()[2].mse);

        let projection = path.projection(2).unwrap();
        assert_abs_diff_eq!(projection.coefficients()[0], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(projection.coefficients()[3], -1.5, epsilon = 1e-8);
        assert_abs_diff_eq!(projection.intercept(), 1.0, epsilon = 1e-8);
        assert!(path.projection(9).is_err());

        let prediction: Array1<f64> = projection.predict(problem.dataset().records());
        assert_eq!(prediction.len(), 80);
    }

    #[test]
    fn search_draws_and_validation_data() {
        let train = problem(1);
        let test = problem(2);
        let reference = SparseReference::new(30);

        let path = ProjPredParams::new(&reference)
            .max_size(4)
            .n_search_draws(5)
            .seed(3)
            .validation(test.dataset().records(), test.dataset().targets())
            .fit(train.dataset())
            .unwrap();

        assert_eq!(path.solution_order().len(), 4);
        assert_eq!(path.solution_order()[0], 0);
        assert_eq!(path.solution_order()[1], 3);
        assert_eq!(path.suggest_size(), 2);
    }

    #[test]
    fn horseshoe_reference_orders_true_signals_first() {
        let problem = problem(42);
        let posterior = varsel_horseshoe::HorseshoeParams::new()
            .n_draws(400)
            .burn_in(400)
            .seed(11)
            .fit(problem.dataset())
            .unwrap();

        let path = ProjPredParams::new(&posterior)
            .max_size(4)
            .fit(problem.dataset())
            .unwrap();

        let mut first_two = path.solution_order()[..2].to_vec();
        first_two.sort_unstable();
        assert_eq!(first_two, vec![0, 3]);
        assert!(path.summaries()[2].elpd > path.summaries()[0].elpd);
    }

    #[test]
    fn collinear_candidates_end_the_search() {
        // the first two columns are identical
        let x = array![[0., 0., 1.], [1., 1., 0.], [2., 2., 0.], [3., 3., 1.], [4., 4., 1.]];
        let targets = array![[1.], [0.], [2.], [5.], [6.]];

        let order = forward_search(x.view(), targets.view(), 3);
        assert_eq!(order.len(), 2);
        assert!(order.contains(&2));
        assert!(order.contains(&0) ^ order.contains(&1));
    }

    #[test]
    fn perfectly_associated_covariates_are_searched() {
        let mut rng = SmallRng::seed_from_u64(42);
        let problem = SyntheticRegression::params()
            .n_samples(60)
            .pattern(CovariancePattern::blocks(&[2, 1]))
            .association(1.0)
            .coefficients(vec![0.5, 0.5, -1.0])
            .generate(&mut rng)
            .unwrap();
        let posterior = varsel_horseshoe::HorseshoeParams::new()
            .n_draws(300)
            .burn_in(300)
            .seed(5)
            .fit(problem.dataset())
            .unwrap();

        let path = ProjPredParams::new(&posterior).fit(problem.dataset()).unwrap();

        // only one of the two identical covariates can enter
        assert_eq!(path.solution_order().len(), 2);
        assert!(path.solution_order().contains(&2));
        assert_eq!(path.summaries().len(), 3);
        assert!(path.suggest_size() <= 2);
        for summary in path.summaries() {
            assert!(summary.elpd.is_finite() && summary.mse.is_finite());
        }
        assert!(path.projection(2).unwrap().coefficients().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let problem = problem(42);
        let reference = SparseReference::new(10);

        assert!(matches!(
            ProjPredParams::new(&reference).max_size(9).fit(problem.dataset()),
            Err(ProjPredError::InvalidMaxSize { max_size: 9, limit: 8 })
        ));
        assert!(matches!(
            ProjPredParams::new(&reference).n_search_draws(11).fit(problem.dataset()),
            Err(ProjPredError::InvalidSearchDraws { requested: 11, available: 10 })
        ));
        assert!(matches!(
            ProjPredParams::new(&reference).n_search_draws(0).fit(problem.dataset()),
            Err(ProjPredError::InvalidSearchDraws { .. })
        ));

        let records = Array2::<f64>::zeros((3, 8));
        let targets = Array1::<f64>::zeros(4);
        assert!(matches!(
            ProjPredParams::new(&reference)
                .validation(&records, &targets)
                .fit(problem.dataset()),
            Err(ProjPredError::BaseCrate(varsel::Error::MismatchedShapes { .. }))
        ));

        let single = Dataset::new(Array2::<f64>::zeros((1, 8)), Array1::<f64>::zeros(1));
        assert!(matches!(
            ProjPredParams::new(&reference).fit(&single),
            Err(ProjPredError::NotEnoughSamples)
        ));
    }
}
