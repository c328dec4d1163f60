use approx::{abs_diff_eq, abs_diff_ne};
use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1, Ix2};

use varsel::dataset::{check_single_target, DatasetBase};
use varsel::preprocessing::Standardization;
use varsel::traits::{Fit, PredictInplace};
use varsel::Float;

use crate::error::{LassoError, Result};
use crate::hyperparams::LassoValidParams;
use crate::Lasso;

impl<F: Float, D: Data<Elem = F>, T: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, LassoError> for LassoValidParams<F>
{
    type Object = Lasso<F>;

    /// Fit a Lasso model given a feature matrix `x` and a target
    /// variable `y`.
    ///
    /// The feature matrix `x` must have shape `(n_samples, n_features)`
    ///
    /// The target variable `y` must have shape `(n_samples)`
    ///
    /// Returns a fitted `Lasso` object which contains the fitted
    /// parameters and can be used to `predict` values of the target variable
    /// for new feature values.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>) -> Result<Self::Object> {
        let problem = Centered::new(dataset.records(), dataset.targets(), self)?;
        let (w, gap, n_steps) = problem.solve(self.penalty, self, None);

        Ok(problem.model(&w, self.penalty, gap, n_steps))
    }
}

/// Centred (and optionally scaled) copy of a regression problem
///
/// Coordinate descent runs on the transformed columns, the fitted coefficients are mapped back
/// to the original columns afterwards.
pub(crate) struct Centered<F> {
    pub(crate) x: Array2<F>,
    pub(crate) y: Array1<F>,
    transform: Standardization<F>,
    y_offset: F,
}

impl<F: Float> Centered<F> {
    pub(crate) fn new<D: Data<Elem = F>, T: Data<Elem = F>>(
        x: &ArrayBase<D, Ix2>,
        y: &ArrayBase<T, Ix1>,
        params: &LassoValidParams<F>,
    ) -> Result<Self> {
        check_single_target(x, y)?;

        let transform = match (params.with_intercept, params.standardize) {
            (true, true) => Standardization::fit(x)?,
            (true, false) => Standardization::centering(x)?,
            (false, true) => Standardization::scaling(x)?,
            (false, false) => Standardization::identity(x.ncols()),
        };
        let y_offset = if params.with_intercept {
            y.mean().ok_or(varsel::Error::NotEnoughSamples)?
        } else {
            F::zero()
        };

        Ok(Centered {
            x: transform.transform(x),
            y: y - y_offset,
            transform,
            y_offset,
        })
    }

    /// Smallest penalty for which all coefficients are zero
    pub(crate) fn alpha_max(&self) -> F {
        let n_samples = F::cast(self.x.nrows());
        let xty = self.x.t().dot(&self.y);

        xty.fold(F::zero(), |m, v| m.max(v.abs())) / n_samples
    }

    /// Run coordinate descent, optionally starting from coefficients of a previous solution
    pub(crate) fn solve(
        &self,
        penalty: F,
        params: &LassoValidParams<F>,
        warm_start: Option<&Array1<F>>,
    ) -> (Array1<F>, F, u32) {
        coordinate_descent(
            self.x.view(),
            self.y.view(),
            params.tolerance,
            params.max_iterations,
            penalty,
            warm_start,
        )
    }

    pub(crate) fn model(&self, w: &Array1<F>, penalty: F, duality_gap: F, n_steps: u32) -> Lasso<F> {
        let (parameters, intercept) = self.transform.unscale_coefficients(w, self.y_offset);

        Lasso {
            parameters,
            intercept,
            penalty,
            duality_gap,
            n_steps,
        }
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for Lasso<F> {
    /// Given an input matrix `X`, with shape `(n_samples, n_features)`,
    /// `predict` returns the target variable according to the Lasso
    /// learned from the training data distribution.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        *y = x.dot(&self.parameters) + self.intercept;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

/// View the fitted parameters and make predictions with a fitted
/// Lasso model
impl<F: Float> Lasso<F> {
    /// Get the fitted parameters
    pub fn parameters(&self) -> &Array1<F> {
        &self.parameters
    }

    /// Get the fitted intercept, 0. if no intercept was fitted
    pub fn intercept(&self) -> F {
        self.intercept
    }

    /// Penalty the model was fitted with
    pub fn penalty(&self) -> F {
        self.penalty
    }

    /// Get the number of steps taken in optimization algorithm
    pub fn n_steps(&self) -> u32 {
        self.n_steps
    }

    /// Get the duality gap at the end of the optimization algorithm
    pub fn duality_gap(&self) -> F {
        self.duality_gap
    }

    /// Indices of the covariates with a non-zero coefficient
    pub fn selected(&self) -> Vec<usize> {
        self.parameters
            .indexed_iter()
            .filter(|(_, w)| abs_diff_ne!(**w, F::zero()))
            .map(|(i, _)| i)
            .collect()
    }
}

pub(crate) fn coordinate_descent<F: Float>(
    x: ArrayView2<F>,
    y: ArrayView1<F>,
    tol: F,
    max_steps: u32,
    penalty: F,
    warm_start: Option<&Array1<F>>,
) -> (Array1<F>, F, u32) {
    let n_samples = F::cast(x.nrows());
    let n_features = x.ncols();
    // the parameters of the model
    let mut w = match warm_start {
        Some(w) => w.clone(),
        None => Array1::<F>::zeros(n_features),
    };
    // the residuals `y - X*w`, updated during the algorithm as the parameters change
    let mut r = &y - &x.dot(&w);
    let mut n_steps = 0u32;
    let norm_cols_x = x.map_axis(Axis(0), |col| col.dot(&col));
    let mut gap = F::one() + tol;
    let d_w_tol = tol;
    let tol = tol * y.dot(&y);
    while n_steps < max_steps {
        let mut w_max = F::zero();
        let mut d_w_max = F::zero();
        for ii in 0..n_features {
            if abs_diff_eq!(norm_cols_x[ii], F::zero()) {
                continue;
            }
            let w_ii = w[ii];
            let x_slc: ArrayView1<F> = x.slice(s![.., ii]);
            if abs_diff_ne!(w_ii, F::zero()) {
                r.scaled_add(w_ii, &x_slc);
            }
            let tmp: F = x_slc.dot(&r);
            w[ii] = tmp.signum() * F::max(tmp.abs() - n_samples * penalty, F::zero())
                / norm_cols_x[ii];
            if abs_diff_ne!(w[ii], F::zero()) {
                r.scaled_add(-w[ii], &x_slc);
            }
            let d_w_ii = (w[ii] - w_ii).abs();
            d_w_max = F::max(d_w_max, d_w_ii);
            w_max = F::max(w_max, w[ii].abs());
        }
        n_steps += 1;

        if n_steps == max_steps || abs_diff_eq!(w_max, F::zero()) || d_w_max / w_max < d_w_tol {
            // We've hit one potential stopping criteria
            // check duality gap for ultimate stopping criterion
            gap = duality_gap(x, y, w.view(), r.view(), penalty);
            if gap <= tol {
                break;
            }
        }
    }

    if gap > tol {
        warn!(
            "coordinate descent did not converge at penalty {} after {} sweeps, duality gap {}",
            penalty, n_steps, gap
        );
    } else {
        debug!("coordinate descent converged at penalty {} after {} sweeps", penalty, n_steps);
    }

    (w, gap, n_steps)
}

pub(crate) fn duality_gap<F: Float>(
    x: ArrayView2<'_, F>,
    y: ArrayView1<'_, F>,
    w: ArrayView1<'_, F>,
    r: ArrayView1<'_, F>,
    penalty: F,
) -> F {
    let half = F::cast(0.5);
    let n_samples = F::cast(x.nrows());
    let l1_reg = penalty * n_samples;
    let xta = x.t().dot(&r);

    let dual_norm_xta = xta.fold(F::zero(), |abs_max, &x| abs_max.max(x.abs()));
    let r_norm2 = r.dot(&r);
    let (const_, mut gap) = if dual_norm_xta > l1_reg {
        let const_ = l1_reg / dual_norm_xta;
        let a_norm2 = r_norm2 * const_ * const_;
        (const_, half * (r_norm2 + a_norm2))
    } else {
        (F::one(), r_norm2)
    };
    let l1_norm = w.fold(F::zero(), |sum, w_i| sum + w_i.abs());
    gap += l1_reg * l1_norm - const_ * r.dot(&y);
    gap
}

#[cfg(test)]
mod tests {
    use super::{coordinate_descent, duality_gap};
    use crate::{Lasso, LassoError};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::StandardNormal;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    use varsel::{
        traits::{Fit, Predict},
        Dataset, ParamGuard,
    };
    use varsel_datasets::{CovariancePattern, SyntheticRegression};

    fn lasso_objective(
        x: &Array2<f64>,
        y: &Array1<f64>,
        intercept: f64,
        beta: &Array1<f64>,
        penalty: f64,
    ) -> f64 {
        squared_error(x, y, intercept, beta) + penalty * beta.mapv(f64::abs).sum()
    }

    fn squared_error(x: &Array2<f64>, y: &Array1<f64>, intercept: f64, beta: &Array1<f64>) -> f64 {
        let resid = y - &x.dot(beta) - intercept;
        resid.dot(&resid) / (2.0 * y.len() as f64)
    }

    #[test]
    fn squared_error_works() {
        let x = array![[2.0, 1.0], [-1.0, 2.0]];
        let y = array![1.0, 1.0];
        let beta = array![0.0, 1.0];
        assert_abs_diff_eq!(squared_error(&x, &y, 0.0, &beta), 0.25);
    }

    #[test]
    fn coordinate_descent_lowers_objective() {
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![1.0, -1.0];
        let beta = array![0.0, 0.0];
        let penalty = 0.001;
        let objective_start = lasso_objective(&x, &y, 0.0, &beta, penalty);
        let opt_result = coordinate_descent(x.view(), y.view(), 1e-4, 3, penalty, None);
        let objective_end = lasso_objective(&x, &y, 0.0, &opt_result.0, penalty);
        assert!(objective_start > objective_end);
    }

    #[test]
    fn duality_gap_of_the_zero_solution() {
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![1.0, -1.0];
        let w = Array1::<f64>::zeros(2);
        // residuals of the zero solution, owned by the caller like in the descent loop
        let r = &y - &x.dot(&w);

        // above alpha_max the zero solution is optimal
        assert_abs_diff_eq!(duality_gap(x.view(), y.view(), w.view(), r.view(), 1.0), 0.0);
        // below it the rescaled dual point leaves a gap of 0.5 * 2.08 - 0.2 * 2
        assert_abs_diff_eq!(
            duality_gap(x.view(), y.view(), w.view(), r.view(), 0.1),
            0.64,
            epsilon = 1e-12
        );
    }

    #[test]
    fn warm_start_at_the_solution_needs_no_extra_sweeps() {
        let x = array![[1.0, 0.5], [0.0, 1.0], [2.0, -1.0]];
        let y = array![1.0, -1.0, 3.0];
        let (w, _, cold_steps) = coordinate_descent(x.view(), y.view(), 1e-10, 1000, 0.1, None);
        let (w2, gap, n_steps) = coordinate_descent(x.view(), y.view(), 1e-10, 1000, 0.1, Some(&w));

        assert_abs_diff_eq!(w, w2, epsilon = 1e-8);
        assert!(gap < 1e-8);
        assert!(n_steps <= cold_steps);
    }

    #[test]
    fn lasso_zero_works() {
        let dataset = Dataset::new(array![[0.], [0.], [0.]], array![0., 0., 0.]);

        let model = Lasso::params().penalty(0.1).fit(&dataset).unwrap();

        assert_abs_diff_eq!(model.intercept(), 0.);
        assert_abs_diff_eq!(model.parameters(), &array![0.]);
        assert!(model.selected().is_empty());
        assert_eq!(model.n_steps(), 1);
    }

    #[test]
    fn lasso_toy_example_works() {
        // Test Lasso on a toy example for various values of alpha.
        // When validating this against glmnet notice that glmnet divides it
        // against n_samples.
        let dataset = Dataset::new(array![[-1.0], [0.0], [1.0]], array![-1.0, 0.0, 1.0]);

        // input for prediction
        let t = array![[2.0], [3.0], [4.0]];
        let model = Lasso::params().penalty(1e-8).fit(&dataset).unwrap();
        assert_abs_diff_eq!(model.intercept(), 0.0);
        assert_abs_diff_eq!(model.parameters(), &array![1.0], epsilon = 1e-6);
        assert_abs_diff_eq!(model.predict(&t), array![2.0, 3.0, 4.0], epsilon = 1e-6);
        assert_abs_diff_eq!(model.duality_gap(), 0.0, epsilon = 1e-12);

        let model = Lasso::params().penalty(0.1).fit(&dataset).unwrap();
        assert_abs_diff_eq!(model.intercept(), 0.0);
        assert_abs_diff_eq!(model.parameters(), &array![0.85], epsilon = 1e-6);
        assert_abs_diff_eq!(model.predict(&t), array![1.7, 2.55, 3.4], epsilon = 1e-6);
        assert_abs_diff_eq!(model.duality_gap(), 0.0, epsilon = 1e-12);

        let model = Lasso::params().penalty(0.5).fit(&dataset).unwrap();
        assert_abs_diff_eq!(model.intercept(), 0.0);
        assert_abs_diff_eq!(model.parameters(), &array![0.25], epsilon = 1e-6);
        assert_abs_diff_eq!(model.predict(&t), array![0.5, 0.75, 1.0], epsilon = 1e-6);
        assert_abs_diff_eq!(model.duality_gap(), 0.0, epsilon = 1e-12);

        let model = Lasso::params().penalty(1.0).fit(&dataset).unwrap();
        assert_abs_diff_eq!(model.intercept(), 0.0);
        assert_abs_diff_eq!(model.parameters(), &array![0.0], epsilon = 1e-6);
        assert_abs_diff_eq!(model.predict(&t), array![0.0, 0.0, 0.0], epsilon = 1e-6);
        assert_abs_diff_eq!(model.duality_gap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lasso_2d_toy_example_works() {
        // without penalty two points are interpolated, the centred columns are collinear so
        // only the fit itself is unique
        let dataset = Dataset::new(array![[1.0, 0.0], [0.0, 1.0]], array![3.0, 2.0]);

        let model = Lasso::params().penalty(0.0).fit(&dataset).unwrap();
        assert_abs_diff_eq!(model.predict(dataset.records()), array![3.0, 2.0], epsilon = 1e-3);
    }

    #[test]
    fn intercept_is_recovered_on_shifted_data() {
        let dataset = Dataset::new(array![[-1.0], [0.0], [1.0]], array![9.0, 10.0, 11.0]);

        let model = Lasso::params().penalty(0.1).fit(&dataset).unwrap();
        assert_abs_diff_eq!(model.intercept(), 10.0, epsilon = 1e-10);
        assert_abs_diff_eq!(model.parameters(), &array![0.85], epsilon = 1e-6);

        // without intercept the shift leaks into the slope
        let model = Lasso::params()
            .penalty(0.1)
            .with_intercept(false)
            .fit(&dataset)
            .unwrap();
        assert_abs_diff_eq!(model.intercept(), 0.0);
    }

    #[test]
    fn standardized_penalty_is_scale_free() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let x: Array2<f64> = Array2::random_using((100, 3), StandardNormal, &mut rng);
        let y = x.dot(&array![1.0, 0.0, -2.0]) + 0.5;

        let scaled = &x * &array![1.0, 100.0, 0.01];
        let params = Lasso::params().penalty(0.1).standardize(true);

        let a = params.fit(&Dataset::new(x, y.clone())).unwrap();
        let b = params.fit(&Dataset::new(scaled, y)).unwrap();

        let rescaled = b.parameters() * &array![1.0, 100.0, 0.01];
        assert_abs_diff_eq!(a.parameters(), &rescaled, epsilon = 1e-4);
        assert_abs_diff_eq!(a.intercept(), b.intercept(), epsilon = 1e-4);
    }

    #[test]
    fn recovers_sparse_support() {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let problem = SyntheticRegression::params()
            .n_samples(200)
            .pattern(CovariancePattern::chain(8))
            .association(0.3)
            .coefficients(vec![2.0, 0.0, 0.0, -1.5, 0.0, 0.0, 0.0, 1.0])
            .noise_std(0.5)
            .generate(&mut rng)
            .unwrap();

        let model = Lasso::params().penalty(0.15).fit(problem.dataset()).unwrap();
        assert_eq!(model.selected(), problem.support());
        assert!(model.duality_gap() < 1e-4 * problem.dataset().targets().mapv(|v| v * v).sum());
    }

    #[test]
    fn invalid_parameters_are_forwarded() {
        let dataset = Dataset::new(array![[1.0], [2.0]], array![1.0, 2.0]);
        assert!(matches!(
            Lasso::params().penalty(-0.1).fit(&dataset),
            Err(LassoError::InvalidPenalty(_))
        ));
        assert!(Lasso::params().penalty(0.1f64).check().is_ok());

        let mismatched = Dataset::new(array![[1.0], [2.0]], array![1.0]);
        assert!(matches!(
            Lasso::params().fit(&mismatched),
            Err(LassoError::BaseCrate(_))
        ));
    }
}
