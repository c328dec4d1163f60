//! Summaries of Markov chains
use ndarray::{ArrayBase, Data, Ix1};

/// Quantile of a sample by linear interpolation between order statistics
///
/// `q` must be in `[0, 1]`, the sample must not be empty.
pub(crate) fn quantile<D: Data<Elem = f64>>(sample: &ArrayBase<D, Ix1>, q: f64) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let h = q * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;

    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn autocorrelation<D: Data<Elem = f64>>(chain: &ArrayBase<D, Ix1>, lag: usize, mean: f64, var: f64) -> f64 {
    let n = chain.len();
    let cov = (0..n - lag)
        .map(|i| (chain[i] - mean) * (chain[i + lag] - mean))
        .sum::<f64>()
        / n as f64;

    cov / var
}

/// Effective sample size of a single chain
///
/// `n / (1 + 2 sum_k rho_k)`, summing the autocorrelations over consecutive pairs of lags while
/// the pair sum stays positive.
pub(crate) fn effective_sample_size<D: Data<Elem = f64>>(chain: &ArrayBase<D, Ix1>) -> f64 {
    let n = chain.len();
    if n < 4 {
        return n as f64;
    }

    let mean = chain.sum() / n as f64;
    let var = chain.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    if var < 1e-300 {
        return n as f64;
    }

    let mut sum_rho = 0.0;
    let mut lag = 1;
    while lag + 1 < n {
        let pair = autocorrelation(chain, lag, mean, var) + autocorrelation(chain, lag + 1, mean, var);
        if pair <= 0.0 {
            break;
        }
        sum_rho += pair;
        lag += 2;
    }

    (n as f64 / (1.0 + 2.0 * sum_rho)).min(n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};
    use ndarray_rand::{rand_distr::StandardNormal, RandomExt};
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn quantiles_interpolate() {
        let x = array![4.0, 1.0, 3.0, 2.0, 5.0];

        assert_abs_diff_eq!(quantile(&x, 0.0), 1.0);
        assert_abs_diff_eq!(quantile(&x, 0.5), 3.0);
        assert_abs_diff_eq!(quantile(&x, 1.0), 5.0);
        assert_abs_diff_eq!(quantile(&x, 0.125), 1.5);
    }

    #[test]
    fn independent_draws_are_fully_effective() {
        let mut rng = SmallRng::seed_from_u64(42);
        let chain = Array1::<f64>::random_using(4000, StandardNormal, &mut rng);

        let ess = effective_sample_size(&chain);
        assert!(ess > 3000.0, "ess {}", ess);
    }

    #[test]
    fn correlated_draws_are_less_effective() {
        let mut rng = SmallRng::seed_from_u64(42);
        let noise = Array1::<f64>::random_using(4000, StandardNormal, &mut rng);

        // AR(1) with coefficient 0.9 has an effective size of about n * 0.1 / 1.9
        let mut chain = Array1::zeros(4000);
        for i in 1..4000 {
            chain[i] = 0.9 * chain[i - 1] + noise[i];
        }

        let ess = effective_sample_size(&chain);
        assert!(ess > 100.0 && ess < 500.0, "ess {}", ess);
    }

    #[test]
    fn constant_chain() {
        assert_abs_diff_eq!(effective_sample_size(&Array1::from_elem(10, 1.0)), 10.0);
    }
}
