use log::debug;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_stats::QuantileExt;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::dataset::{check_single_target, DatasetBase};
use varsel::metrics::SingleTargetRegression;
use varsel::traits::{Fit, Predict, PredictInplace};
use varsel::Float;

use crate::algorithm::Centered;
use crate::error::{LassoError, Result};
use crate::hyperparams::LassoCvValidParams;
use crate::path::{alpha_grid, solve_path, sorted_descending};
use crate::Lasso;

/// Outcome of cross validating the Lasso penalty
///
/// Every penalty of the grid is scored by the mean squared error on the held-out folds. Two
/// penalties are reported: `alpha_min` with the smallest mean error, and `alpha_1se`, the
/// largest penalty whose mean error is within one standard error of that minimum. The latter
/// gives sparser models with a comparable fit.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LassoCvResult<F> {
    alphas: Array1<F>,
    mse_path: Array2<F>,
    mean_mse: Array1<F>,
    se_mse: Array1<F>,
    index_min: usize,
    index_1se: usize,
    model: Lasso<F>,
    model_1se: Lasso<F>,
}

impl<F: Float> LassoCvResult<F> {
    /// Evaluated penalties in decreasing order
    pub fn alphas(&self) -> &Array1<F> {
        &self.alphas
    }

    /// Validation error with shape `(n_alphas, n_folds)`
    pub fn mse_path(&self) -> &Array2<F> {
        &self.mse_path
    }

    pub fn mean_mse(&self) -> &Array1<F> {
        &self.mean_mse
    }

    /// Standard error of the mean validation error over folds
    pub fn se_mse(&self) -> &Array1<F> {
        &self.se_mse
    }

    pub fn alpha_min(&self) -> F {
        self.alphas[self.index_min]
    }

    pub fn alpha_1se(&self) -> F {
        self.alphas[self.index_1se]
    }

    /// Lasso refitted on all samples at [`alpha_min`](Self::alpha_min)
    pub fn model(&self) -> &Lasso<F> {
        &self.model
    }

    /// Lasso refitted on all samples at [`alpha_1se`](Self::alpha_1se)
    pub fn model_1se(&self) -> &Lasso<F> {
        &self.model_1se
    }
}

/// Index of the largest penalty within one standard error of the best mean error
///
/// `mean` follows penalties in decreasing order.
fn one_standard_error<F: Float>(mean: &Array1<F>, se: &Array1<F>, index_min: usize) -> usize {
    let threshold = mean[index_min] + se[index_min];

    mean.iter()
        .position(|m| *m <= threshold)
        .unwrap_or(index_min)
}

impl<F: Float, D: Data<Elem = F>, T: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, LassoError> for LassoCvValidParams<F>
{
    type Object = LassoCvResult<F>;

    /// Cross validate the penalty and refit on the whole dataset
    ///
    /// The default grid is computed once on all samples, then every fold runs a warm-started
    /// path on its training part and is scored on its validation part.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>) -> Result<Self::Object> {
        check_single_target(dataset.records(), dataset.targets())?;

        let alphas = match &self.alphas {
            Some(alphas) => sorted_descending(alphas),
            None => alpha_grid(dataset, self.n_alphas, self.eps, &self.lasso)?.to_vec(),
        };

        let folds = dataset.fold(self.n_folds)?;
        let mut mse_path = Array2::zeros((alphas.len(), self.n_folds));
        for (j, (train, valid)) in folds.iter().enumerate() {
            let problem = Centered::new(train.records(), train.targets(), &self.lasso)?;
            for (i, model) in solve_path(&problem, &alphas, &self.lasso).iter().enumerate() {
                let prediction: Array1<F> = model.predict(valid.records());
                mse_path[(i, j)] = prediction.mean_squared_error(valid.targets())?;
            }
            debug!("finished fold {} of {}", j + 1, self.n_folds);
        }

        let mean_mse = mse_path
            .mean_axis(Axis(1))
            .ok_or(varsel::Error::NotEnoughSamples)?;
        let n_folds = F::cast(self.n_folds);
        let se_mse = mse_path.std_axis(Axis(1), F::one()) / n_folds.sqrt();

        let index_min = mean_mse.argmin().map_err(|_| LassoError::EmptyPath)?;
        let index_1se = one_standard_error(&mean_mse, &se_mse, index_min);
        debug!(
            "cross validation chose alpha {:?} (one standard error: {:?})",
            alphas[index_min].to_f64(),
            alphas[index_1se].to_f64()
        );

        // the 1se penalty is never smaller, so one warm-started path covers both refits
        let problem = Centered::new(dataset.records(), dataset.targets(), &self.lasso)?;
        let mut refits = solve_path(&problem, &alphas[..=index_min], &self.lasso);
        let model_1se = refits[index_1se].clone();
        let model = refits.remove(index_min);

        Ok(LassoCvResult {
            alphas: Array1::from(alphas),
            mse_path,
            mean_mse,
            se_mse,
            index_min,
            index_1se,
            model,
            model_1se,
        })
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for LassoCvResult<F> {
    /// Predict with the model refitted at the penalty of minimal validation error
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        self.model.predict_inplace(x, y);
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::{rngs::SmallRng, SeedableRng};
    use varsel::ParamGuard;
    use varsel_datasets::{CovariancePattern, SyntheticRegression};

    use crate::LassoCvParams;

    fn sparse_problem(seed: u64) -> SyntheticRegression {
        let mut rng = SmallRng::seed_from_u64(seed);
        SyntheticRegression::params()
            .n_samples(150)
            .pattern(CovariancePattern::blocks(&[4, 4]))
            .association(0.5)
            .coefficients(vec![1.5, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0])
            .noise_std(0.5)
            .generate(&mut rng)
            .unwrap()
    }

    #[test]
    fn one_standard_error_rule() {
        let mean = array![4.0, 2.5, 2.1, 2.0, 2.2];
        let se = array![0.1, 0.1, 0.1, 0.2, 0.1];

        assert_eq!(one_standard_error(&mean, &se, 3), 2);
        assert_eq!(one_standard_error(&mean, &Array1::zeros(5), 3), 3);
    }

    #[test]
    fn one_standard_error_alpha_is_not_smaller() {
        let problem = sparse_problem(42);
        let result = Lasso::cv()
            .n_alphas(30)
            .fit(problem.dataset())
            .unwrap();

        assert_eq!(result.alphas().len(), 30);
        assert_eq!(result.mse_path().dim(), (30, 5));
        assert!(result.alpha_1se() >= result.alpha_min());
        assert_abs_diff_eq!(result.model_1se().penalty(), result.alpha_1se());
        assert_abs_diff_eq!(result.model().penalty(), result.alpha_min());

        // the largest penalty predicts the mean only
        let largest = result.mean_mse()[0];
        assert!(result.mean_mse().iter().all(|m| *m <= largest + 1e-12));
    }

    #[test]
    fn recovers_sparse_support() {
        let problem = sparse_problem(7);
        let result = Lasso::cv()
            .n_alphas(40)
            .tolerance(1e-8)
            .fit(problem.dataset())
            .unwrap();

        let support = result.model_1se().selected();
        assert!(support.contains(&0));
        assert!(support.contains(&4));

        let prediction = result.predict(problem.dataset().records());
        let mse = prediction.mean_squared_error(problem.dataset().targets()).unwrap();
        assert!(mse < 0.5);
    }

    #[test]
    fn explicit_alphas_are_sorted() {
        let problem = sparse_problem(1);
        let params = LassoCvParams::new()
            .alphas(vec![0.01, 1.0, 0.1])
            .n_folds(3)
            .check()
            .unwrap();
        let result = params.fit(problem.dataset()).unwrap();

        assert_abs_diff_eq!(result.alphas(), &array![1.0, 0.1, 0.01]);
        assert_eq!(result.se_mse().len(), 3);
    }

    #[test]
    fn too_many_folds() {
        let dataset = varsel::Dataset::new(array![[1.0], [2.0], [3.0]], array![1.0, 2.0, 3.0]);
        let res = Lasso::cv().n_folds(4).alphas(vec![0.1]).fit(&dataset);

        assert!(matches!(res, Err(LassoError::BaseCrate(_))));
    }
}
