use rand::{rngs::SmallRng, SeedableRng};
use varsel::traits::Fit;
use varsel_datasets::{CovariancePattern, SyntheticRegression};
use varsel_reduction::{Pcr, ReductionError};

fn main() -> Result<(), ReductionError> {
    env_logger::init();
    let mut rng = SmallRng::seed_from_u64(42);

    let problem = SyntheticRegression::params()
        .n_samples(200)
        .pattern(CovariancePattern::blocks(&[4, 4]))
        .association(0.9)
        .coefficients(vec![0.5, 0.5, 0.5, 0.5, 0.0, 0.0, 0.0, -1.0])
        .generate(&mut rng)
        .map_err(|e| varsel::Error::Parameters(e.to_string()))?;
    let dataset = problem.dataset();

    // how many components does it take?
    let mse = Pcr::cross_validate(dataset, 10)?;
    for (i, m) in mse.iter().enumerate() {
        println!("{} components: validation mse {:.4}", i + 1, m);
    }

    let best = mse
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |acc, (i, m)| if *m < acc.1 { (i, *m) } else { acc })
        .0
        + 1;
    let model = Pcr::params(best).fit(dataset)?;
    println!("explained variance ratio {:.3}", model.pca().explained_variance_ratio());
    println!("coefficients {:.3}", model.coefficients());
    println!("true coefficients {:.3}", problem.coefficients());

    Ok(())
}
