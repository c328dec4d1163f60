//! Gibbs sampler for linear regression with a horseshoe prior
//!
//! The half-Cauchy priors on the local scales `lambda_j` and the global scale `tau` are written
//! as mixtures of inverse-gamma distributions,
//!
//! ```text
//! lambda_j^2 | nu_j ~ IG(1/2, 1/nu_j),   nu_j ~ IG(1/2, 1)
//! tau^2 | xi       ~ IG(1/2, 1/xi),      xi   ~ IG(1/2, 1/tau0^2)
//! ```
//!
//! which makes every full conditional a standard distribution:
//!
//! ```text
//! beta     ~ N(A^-1 X'y, sigma^2 A^-1),  A = X'X + diag(1 / (lambda_j^2 tau^2))
//! sigma^2  ~ IG((n + p) / 2, (|y - X beta|^2 + sum_j beta_j^2 / (lambda_j^2 tau^2)) / 2)
//! lambda_j^2 ~ IG(1, 1/nu_j + beta_j^2 / (2 tau^2 sigma^2))
//! tau^2    ~ IG((p + 1) / 2, 1/xi + sum_j beta_j^2 / (2 sigma^2 lambda_j^2))
//! nu_j     ~ IG(1, 1 + 1/lambda_j^2)
//! xi       ~ IG(1, 1/tau0^2 + 1/tau^2)
//! ```
//!
//! See Makalic and Schmidt, "A simple sampler for the horseshoe estimator", IEEE Signal
//! Processing Letters, 2016.
use log::debug;
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_rand::rand_distr::{Distribution, Gamma, StandardNormal};
use ndarray_rand::RandomExt;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use varsel::dataset::{check_single_target, DatasetBase};
use varsel::linalg;
use varsel::traits::Fit;

use crate::error::{HorseshoeError, Result};
use crate::hyperparams::HorseshoeValidParams;
use crate::posterior::HorseshoePosterior;

/// Scales are kept inside this range to keep the precision matrix well conditioned
const SCALE_MIN: f64 = 1e-12;
const SCALE_MAX: f64 = 1e12;

/// Draw from an inverse-gamma distribution with the given shape and rate
fn inverse_gamma<R: Rng>(rng: &mut R, shape: f64, rate: f64) -> Result<f64> {
    // rand_distr uses the shape-scale parameterisation
    let gamma = Gamma::new(shape, 1.0 / rate)?;
    Ok(1.0 / gamma.sample(rng))
}

/// Retained draws of one chain
struct Chain {
    beta: Array2<f64>,
    sigma2: Array1<f64>,
    tau: Array1<f64>,
    lambda: Array2<f64>,
}

/// Sufficient statistics of the centred problem
struct Centered {
    x: Array2<f64>,
    y: Array1<f64>,
    xtx: Array2<f64>,
    xty: Array1<f64>,
}

impl Centered {
    fn nfeatures(&self) -> usize {
        self.x.ncols()
    }

    fn nsamples(&self) -> usize {
        self.x.nrows()
    }
}

fn run_chain<R: Rng>(
    problem: &Centered,
    params: &HorseshoeValidParams,
    rng: &mut R,
) -> Result<Chain> {
    let n = problem.nsamples() as f64;
    let p = problem.nfeatures();
    let tau0_sq = params.global_scale * params.global_scale;

    let mut chain = Chain {
        beta: Array2::zeros((params.n_draws, p)),
        sigma2: Array1::zeros(params.n_draws),
        tau: Array1::zeros(params.n_draws),
        lambda: Array2::zeros((params.n_draws, p)),
    };

    let mut sigma2 = problem.y.var(0.0).max(SCALE_MIN);
    let mut lambda2 = Array1::<f64>::ones(p);
    let mut nu = Array1::<f64>::ones(p);
    let mut tau2 = tau0_sq;
    let mut xi = 1.0;

    let n_iterations = params.burn_in + params.n_draws * params.thin;
    let mut kept = 0;
    for iteration in 0..n_iterations {
        // coefficients
        let mut precision = problem.xtx.clone();
        for (j, l2) in lambda2.iter().enumerate() {
            precision[(j, j)] += 1.0 / (l2 * tau2);
        }
        let l = linalg::cholesky_lower(&precision)?;
        let mean = linalg::cho_solve(&l, &problem.xty)?;
        let z = Array2::<f64>::random_using((p, 1), StandardNormal, rng);
        let noise = linalg::solve_lower_transposed(&l, z)?;
        let beta = mean + noise.column(0).mapv(|v| v * sigma2.sqrt());

        // noise variance
        let residual = &problem.y - &problem.x.dot(&beta);
        let penalty = beta
            .iter()
            .zip(lambda2.iter())
            .map(|(b, l2)| b * b / (l2 * tau2))
            .sum::<f64>();
        sigma2 = inverse_gamma(
            rng,
            (n + p as f64) / 2.0,
            (residual.dot(&residual) + penalty) / 2.0,
        )?
        .clamp(SCALE_MIN, SCALE_MAX);

        // local scales and their auxiliaries
        for j in 0..p {
            let rate = 1.0 / nu[j] + beta[j] * beta[j] / (2.0 * tau2 * sigma2);
            lambda2[j] = inverse_gamma(rng, 1.0, rate)?.clamp(SCALE_MIN, SCALE_MAX);
            nu[j] = inverse_gamma(rng, 1.0, 1.0 + 1.0 / lambda2[j])?;
        }

        // global scale and its auxiliary
        let spread = beta
            .iter()
            .zip(lambda2.iter())
            .map(|(b, l2)| b * b / l2)
            .sum::<f64>();
        tau2 = inverse_gamma(
            rng,
            (p as f64 + 1.0) / 2.0,
            1.0 / xi + spread / (2.0 * sigma2),
        )?
        .clamp(SCALE_MIN, SCALE_MAX);
        xi = inverse_gamma(rng, 1.0, 1.0 / tau0_sq + 1.0 / tau2)?;

        if iteration >= params.burn_in && (iteration - params.burn_in) % params.thin == 0 {
            chain.beta.row_mut(kept).assign(&beta);
            chain.lambda.row_mut(kept).assign(&lambda2.mapv(f64::sqrt));
            chain.sigma2[kept] = sigma2;
            chain.tau[kept] = tau2.sqrt();
            kept += 1;
        }
    }

    Ok(chain)
}

impl<D: Data<Elem = f64>, T: Data<Elem = f64>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>, HorseshoeError> for HorseshoeValidParams
{
    type Object = HorseshoePosterior;

    /// Sample the posterior of a horseshoe regression
    ///
    /// Columns and response are centred, so the flat-prior intercept drops out of the sampler.
    /// Its draws are reconstructed from the conditional `N(mean(y) - mean(x) beta, sigma^2 / n)`.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>>) -> Result<HorseshoePosterior> {
        let (x, y) = (dataset.records(), dataset.targets());
        check_single_target(x, y)?;
        if x.nrows() < 2 {
            return Err(HorseshoeError::NotEnoughSamples);
        }

        let x_mean = x.mean_axis(Axis(0)).ok_or(HorseshoeError::NotEnoughSamples)?;
        let y_mean = y.mean().ok_or(HorseshoeError::NotEnoughSamples)?;
        let xc = x - &x_mean;
        let yc = y - y_mean;
        let problem = Centered {
            xtx: xc.t().dot(&xc),
            xty: xc.t().dot(&yc),
            x: xc,
            y: yc,
        };

        let (n, p) = x.dim();
        let total = self.n_draws * self.n_chains;
        let mut beta = Array2::zeros((total, p));
        let mut lambda = Array2::zeros((total, p));
        let mut sigma2 = Array1::zeros(total);
        let mut tau = Array1::zeros(total);
        let mut intercept = Array1::zeros(total);

        for c in 0..self.n_chains {
            let mut rng = Xoshiro256Plus::seed_from_u64(self.seed.wrapping_add(c as u64));
            let chain = run_chain(&problem, self, &mut rng)?;

            let (start, end) = (c * self.n_draws, (c + 1) * self.n_draws);
            beta.slice_mut(s![start..end, ..]).assign(&chain.beta);
            lambda.slice_mut(s![start..end, ..]).assign(&chain.lambda);
            sigma2.slice_mut(s![start..end]).assign(&chain.sigma2);
            tau.slice_mut(s![start..end]).assign(&chain.tau);

            let z = Array1::<f64>::random_using(self.n_draws, StandardNormal, &mut rng);
            let b0 = (y_mean - chain.beta.dot(&x_mean))
                + &(chain.sigma2.mapv(|s2| (s2 / n as f64).sqrt()) * &z);
            intercept.slice_mut(s![start..end]).assign(&b0);

            debug!(
                "horseshoe chain {} of {}: mean tau {:.4}, mean sigma^2 {:.4}",
                c + 1,
                self.n_chains,
                chain.tau.mean().unwrap_or(f64::NAN),
                chain.sigma2.mean().unwrap_or(f64::NAN)
            );
        }

        Ok(HorseshoePosterior {
            coefficient_draws: beta,
            intercept_draws: intercept,
            sigma2_draws: sigma2,
            tau_draws: tau,
            lambda_draws: lambda,
            column_variance: problem.x.var_axis(Axis(0), 0.0),
            n_samples: n,
            n_chains: self.n_chains,
            feature_names: dataset.feature_names(),
        })
    }
}
