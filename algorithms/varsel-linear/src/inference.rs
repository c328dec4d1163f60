//! Classical inference for least squares coefficients
use std::fmt;

use ndarray::{Array1, Array2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use varsel::Float;

use crate::error::{LinearError, Result};
use crate::ols::FittedLinearRegression;

/// One row of a regression table
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSummary<F> {
    pub name: String,
    pub estimate: F,
    pub std_error: F,
    pub t_value: F,
    pub p_value: F,
}

impl<F: Float> FittedLinearRegression<F> {
    fn students_t(&self) -> Result<StudentsT> {
        Ok(StudentsT::new(0.0, 1.0, self.dof as f64)?)
    }

    fn two_sided_p(dist: &StudentsT, t: F) -> F {
        let t = t.to_f64().unwrap_or(f64::NAN).abs();
        F::cast(2.0 * dist.sf(t))
    }

    /// Two-sided p-value of every coefficient under the null hypothesis of a zero effect
    ///
    /// The t statistics follow a Student-t distribution with `n - k` degrees of freedom.
    pub fn p_values(&self) -> Result<Array1<F>> {
        let dist = self.students_t()?;
        Ok(self.t_values().mapv(|t| Self::two_sided_p(&dist, t)))
    }

    /// Confidence intervals of every coefficient at the given level
    ///
    /// Returns an array of shape `(n_features, 2)` with lower and upper bounds.
    pub fn confidence_intervals(&self, level: f64) -> Result<Array2<F>> {
        if !(level > 0.0 && level < 1.0) {
            return Err(LinearError::InvalidLevel(level));
        }
        let dist = self.students_t()?;
        let q = F::cast(dist.inverse_cdf(0.5 + level / 2.0));

        let se = self.standard_errors();
        let mut intervals = Array2::zeros((se.len(), 2));
        for (i, (b, s)) in self.params().iter().zip(se.iter()).enumerate() {
            intervals[(i, 0)] = *b - q * *s;
            intervals[(i, 1)] = *b + q * *s;
        }

        Ok(intervals)
    }

    /// Regression table, the intercept comes first when it was fitted
    pub fn summary(&self) -> Result<Vec<CoefficientSummary<F>>> {
        let dist = self.students_t()?;

        let mut names = Vec::with_capacity(self.covariance.nrows());
        let mut estimates = Vec::with_capacity(self.covariance.nrows());
        if self.fit_intercept {
            names.push("intercept".to_string());
            estimates.push(self.intercept());
        }
        names.extend(self.feature_names.iter().cloned());
        estimates.extend(self.params().iter().cloned());

        Ok(names
            .into_iter()
            .zip(estimates)
            .zip(self.covariance.diag())
            .map(|((name, estimate), var)| {
                let std_error = var.sqrt();
                let t_value = estimate / std_error;
                CoefficientSummary {
                    name,
                    estimate,
                    std_error,
                    t_value,
                    p_value: Self::two_sided_p(&dist, t_value),
                }
            })
            .collect())
    }
}

impl<F: Float> fmt::Display for FittedLinearRegression<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rows = self.summary().map_err(|_| fmt::Error)?;
        let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(9);

        writeln!(
            f,
            "{:<width$} {:>10} {:>10} {:>8} {:>8}",
            "term",
            "estimate",
            "std.error",
            "t",
            "p",
            width = width
        )?;
        for row in &rows {
            writeln!(
                f,
                "{:<width$} {:>10.4} {:>10.4} {:>8.3} {:>8.4}",
                row.name,
                row.estimate,
                row.std_error,
                row.t_value,
                row.p_value,
                width = width
            )?;
        }
        write!(
            f,
            "residual variance {:.4} on {} degrees of freedom, r2 {:.4}",
            self.residual_variance(),
            self.degrees_of_freedom(),
            self.r2()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::LinearRegression;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};
    use rand::{rngs::SmallRng, SeedableRng};
    use varsel::{traits::Fit, Dataset};
    use varsel_datasets::{CovariancePattern, SyntheticRegression};

    #[test]
    fn textbook_p_value_and_interval() {
        // t = 0.8 / sqrt(0.12) = 2.3094 on 3 degrees of freedom
        let dataset = Dataset::new(array![[1.], [2.], [3.], [4.], [5.]], array![1., 3., 2., 5., 4.]);
        let model = LinearRegression::new().fit(&dataset).unwrap();

        assert_abs_diff_eq!(model.t_values()[0], 2.309401, epsilon = 1e-5);
        assert_abs_diff_eq!(model.p_values().unwrap()[0], 0.1041, epsilon = 1e-3);

        // t quantile 0.975 on 3 dof is 3.182446
        let ci = model.confidence_intervals(0.95).unwrap();
        assert_abs_diff_eq!(ci[(0, 0)], 0.8 - 3.182446 * 0.12f64.sqrt(), epsilon = 1e-4);
        assert_abs_diff_eq!(ci[(0, 1)], 0.8 + 3.182446 * 0.12f64.sqrt(), epsilon = 1e-4);

        assert!(model.confidence_intervals(1.0).is_err());
        assert!(model.confidence_intervals(0.0).is_err());
    }

    #[test]
    fn summary_names_every_term() {
        let dataset = Dataset::new(
            array![[1., 0.5], [2., -1.], [3., 0.], [4., 2.], [5., 1.]],
            array![1., 3., 2., 5., 4.],
        )
        .with_feature_names(vec!["dose", "age"]);
        let model = LinearRegression::new().fit(&dataset).unwrap();
        let rows = model.summary().unwrap();

        let names = rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["intercept", "dose", "age"]);
        assert_abs_diff_eq!(rows[1].estimate, model.params()[0]);
        assert_abs_diff_eq!(rows[2].std_error, model.standard_errors()[1], epsilon = 1e-12);
        assert!(format!("{}", model).contains("dose"));
    }

    #[test]
    fn strong_effects_are_significant() {
        let mut rng = SmallRng::seed_from_u64(42);
        let problem = SyntheticRegression::params()
            .n_samples(200)
            .pattern(CovariancePattern::independent(4))
            .coefficients(vec![2.0, 0.0, -1.5, 0.0])
            .noise_std(1.0)
            .generate(&mut rng)
            .unwrap();
        let model = LinearRegression::new().fit(problem.dataset()).unwrap();
        let p = model.p_values().unwrap();

        assert!(p[0] < 1e-6);
        assert!(p[2] < 1e-6);
        assert!(p[1] > 1e-4);
        assert!(p[3] > 1e-4);
        assert_abs_diff_eq!(model.params(), &array![2.0, 0.0, -1.5, 0.0], epsilon = 0.3);
    }

    #[test]
    fn collinearity_inflates_standard_errors() {
        let coefficients = vec![1.0, 1.0, 0.0];
        let fit = |association: f64| {
            let mut rng = SmallRng::seed_from_u64(3);
            let problem = SyntheticRegression::params()
                .n_samples(300)
                .pattern(CovariancePattern::full(3))
                .association(association)
                .coefficients(coefficients.clone())
                .generate(&mut rng)
                .unwrap();
            LinearRegression::new()
                .fit(problem.dataset())
                .unwrap()
                .standard_errors()
        };

        let independent: Array1<f64> = fit(0.0);
        let correlated: Array1<f64> = fit(0.95);
        for (a, b) in independent.iter().zip(correlated.iter()) {
            assert!(b > &(2.0 * a));
        }
    }
}
