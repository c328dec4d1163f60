use rand::{rngs::SmallRng, SeedableRng};
use varsel::prelude::*;
use varsel_datasets::{CovariancePattern, SyntheticRegression};
use varsel_lasso::{alpha_grid, lasso_path, Lasso, LassoError};

fn main() -> std::result::Result<(), LassoError> {
    env_logger::init();
    let mut rng = SmallRng::seed_from_u64(42);

    // two correlated blocks, one true signal in each
    let problem = SyntheticRegression::params()
        .n_samples(200)
        .pattern(CovariancePattern::blocks(&[5, 5]))
        .association(0.8)
        .coefficients(vec![1.0, 0.0, 0.0, 0.0, 0.0, -0.8, 0.0, 0.0, 0.0, 0.0])
        .noise_std(1.0)
        .generate(&mut rng)
        .map_err(|e| LassoError::BaseCrate(Error::Parameters(e.to_string())))?;
    let dataset = problem.dataset();

    // coefficients along the regularisation path
    let params = Lasso::params().check()?;
    let grid = alpha_grid(dataset, 10, 1e-2, &params)?;
    let path = lasso_path(dataset, &grid.to_vec(), &params)?;
    for (alpha, n_selected) in path.alphas().iter().zip(path.n_selected()) {
        println!("alpha {:.4}: {} selected", alpha, n_selected);
    }

    // compare a few penalties by their mean validation r2
    let penalties = vec![0.01, 0.05, 0.1, 0.3];
    let models = penalties
        .iter()
        .map(|alpha| Lasso::params().penalty(*alpha))
        .collect::<Vec<_>>();
    let r2_values =
        dataset.cross_validate_single(5, &models, |prediction, truth| prediction.r2(truth))?;
    for (alpha, r2) in penalties.iter().zip(r2_values.iter()) {
        println!("alpha {}: r2 {:.4}", alpha, r2);
    }

    // let the folds pick the penalty
    let cv = Lasso::cv().n_folds(10).fit(dataset)?;
    println!(
        "alpha_min {:.4} selects {:?}",
        cv.alpha_min(),
        cv.model().selected()
    );
    println!(
        "alpha_1se {:.4} selects {:?}",
        cv.alpha_1se(),
        cv.model_1se().selected()
    );
    println!("true support {:?}", problem.support());

    Ok(())
}
