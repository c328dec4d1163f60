use rand::{rngs::SmallRng, SeedableRng};
use varsel::prelude::{condition_number, variance_inflation_factors, Fit, PearsonCorrelation};
use varsel_datasets::{CovariancePattern, SyntheticRegression};
use varsel_linear::LinearRegression;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // the same effects, once on independent and once on strongly associated covariates
    for association in &[0.0, 0.9] {
        let mut rng = SmallRng::seed_from_u64(42);
        let problem = SyntheticRegression::params()
            .n_samples(100)
            .pattern(CovariancePattern::blocks(&[3, 3]))
            .standard_deviations(vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0])
            .association(*association)
            .coefficients(vec![1.0, 0.5, 0.0, 0.0, -0.5, 0.0])
            .intercept(2.0)
            .noise_std(1.0)
            .generate(&mut rng)?;
        let dataset = problem.dataset();

        println!("association {}", association);
        println!("{}", PearsonCorrelation::from_dataset(dataset)?);
        println!(
            "variance inflation factors {:.2}",
            variance_inflation_factors(dataset.records())?
        );
        println!("condition number {:.2}", condition_number(dataset.records())?);

        let model = LinearRegression::default().fit(dataset)?;
        println!("{}", model);
        println!("95% intervals\n{:.3}\n", model.confidence_intervals(0.95)?);
    }

    Ok(())
}
