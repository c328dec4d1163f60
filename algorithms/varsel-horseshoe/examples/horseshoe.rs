use rand::{rngs::SmallRng, SeedableRng};
use varsel::traits::Fit;
use varsel_datasets::{CovariancePattern, SyntheticRegression};
use varsel_horseshoe::{HorseshoeError, HorseshoeParams};

fn main() -> Result<(), HorseshoeError> {
    env_logger::init();
    let mut rng = SmallRng::seed_from_u64(42);

    let problem = SyntheticRegression::params()
        .n_samples(100)
        .pattern(CovariancePattern::blocks(&[5, 5]))
        .association(0.7)
        .coefficients(vec![2.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0])
        .generate(&mut rng)
        .map_err(|e| varsel::Error::Parameters(e.to_string()))?;

    let posterior = HorseshoeParams::new()
        .n_draws(2000)
        .burn_in(1000)
        .n_chains(2)
        .seed(1)
        .fit(problem.dataset())?;

    let mean = posterior.posterior_mean();
    let sd = posterior.posterior_sd();
    let ci = posterior.credible_intervals(0.95)?;
    let kappa = posterior.shrinkage_factors();
    let ess = posterior.effective_sample_size();

    println!(
        "{:<6} {:>8} {:>8} {:>8} {:>8} {:>7} {:>7} {:>6}",
        "term", "true", "mean", "sd", "2.5%", "97.5%", "kappa", "ess"
    );
    for (j, name) in posterior.feature_names().iter().enumerate() {
        println!(
            "{:<6} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>7.3} {:>7.3} {:>6.0}",
            name,
            problem.coefficients()[j],
            mean[j],
            sd[j],
            ci[(j, 0)],
            ci[(j, 1)],
            kappa[j],
            ess[j]
        );
    }
    println!("selected at 95%: {:?}", posterior.selected(0.95)?);

    Ok(())
}
