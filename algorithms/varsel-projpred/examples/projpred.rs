use rand::{rngs::SmallRng, SeedableRng};
use varsel::traits::Fit;
use varsel_datasets::{CovariancePattern, SyntheticRegression};
use varsel_horseshoe::HorseshoeParams;
use varsel_projpred::{ProjPredError, ProjPredParams};

fn main() -> Result<(), ProjPredError> {
    env_logger::init();
    let mut rng = SmallRng::seed_from_u64(42);

    let generate = |n_samples, rng: &mut SmallRng| {
        SyntheticRegression::params()
            .n_samples(n_samples)
            .pattern(CovariancePattern::blocks(&[4, 4, 4]))
            .association(0.6)
            .coefficients(vec![
                1.5, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.8, 0.0, 0.0, 0.0,
            ])
            .intercept(2.0)
            .generate(rng)
            .map_err(|e| varsel::Error::Parameters(e.to_string()))
    };
    let train = generate(120, &mut rng)?;
    let test = generate(500, &mut rng)?;

    let posterior = HorseshoeParams::new()
        .n_draws(1000)
        .burn_in(1000)
        .seed(7)
        .fit(train.dataset())
        .map_err(|e| varsel::Error::Parameters(e.to_string()))?;

    println!("in-sample search");
    let path = ProjPredParams::new(&posterior)
        .max_size(6)
        .fit(train.dataset())?;
    println!("{}", path);
    println!("solution order: {:?}", path.solution_names());

    println!("\nheld-out evaluation, search on 100 draws");
    let path = ProjPredParams::new(&posterior)
        .max_size(6)
        .n_search_draws(100)
        .validation(test.dataset().records(), test.dataset().targets())
        .fit(train.dataset())?;
    println!("{}", path);

    let size = path.suggest_size();
    let submodel = path.projection(size)?;
    println!(
        "suggested size {}: intercept {:.3}, coefficients {:.3}",
        size,
        submodel.intercept(),
        submodel.coefficients()
    );

    Ok(())
}
