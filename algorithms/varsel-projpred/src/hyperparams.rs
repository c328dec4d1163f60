use ndarray::{ArrayBase, ArrayView1, ArrayView2, Data, Ix1, Ix2};

use varsel::ParamGuard;

use crate::error::{ProjPredError, Result};
use crate::reference::ReferenceModel;

/// Checked settings of a projection predictive search
#[derive(Debug)]
pub struct ProjPredValidParams<'a, M> {
    pub(crate) reference: &'a M,
    pub(crate) max_size: Option<usize>,
    pub(crate) n_search_draws: Option<usize>,
    pub(crate) seed: u64,
    pub(crate) validation: Option<(ArrayView2<'a, f64>, ArrayView1<'a, f64>)>,
}

impl<'a, M: ReferenceModel> ProjPredValidParams<'a, M> {
    pub fn reference(&self) -> &M {
        self.reference
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn n_search_draws(&self) -> Option<usize> {
        self.n_search_draws
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn validation(&self) -> Option<(ArrayView2<'a, f64>, ArrayView1<'a, f64>)> {
        self.validation
    }
}

/// Settings of a projection predictive search
///
/// The reference model is borrowed for the lifetime of the parameter set, the dataset passed to
/// [`Fit::fit`](varsel::traits::Fit::fit) must be the one the reference model was fitted on.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [max_size](Self::max_size) | `min(n_features, n_samples - 1)` | Largest submodel on the search path | `[0, min(n_features, n_samples - 1)]` |
/// | [n_search_draws](Self::n_search_draws) | posterior mean | Reference draws driving the forward search | `[1, n_draws]` |
/// | [seed](Self::seed) | `42` | Seed for choosing the search draws | any |
/// | [validation](Self::validation) | none | Held-out data for evaluating the submodels | |
///
/// Without validation data the submodels are evaluated on the training data.
#[derive(Debug)]
pub struct ProjPredParams<'a, M>(pub(crate) ProjPredValidParams<'a, M>);

impl<'a, M: ReferenceModel> ProjPredParams<'a, M> {
    pub fn new(reference: &'a M) -> Self {
        Self(ProjPredValidParams {
            reference,
            max_size: None,
            n_search_draws: None,
            seed: 42,
            validation: None,
        })
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.0.max_size = Some(max_size);
        self
    }

    /// Drive the search by this many randomly chosen reference draws instead of the posterior
    /// mean of the linear predictor
    pub fn n_search_draws(mut self, n_search_draws: usize) -> Self {
        self.0.n_search_draws = Some(n_search_draws);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    /// Evaluate submodels on held-out records and targets
    pub fn validation<D: Data<Elem = f64>, T: Data<Elem = f64>>(
        mut self,
        records: &'a ArrayBase<D, Ix2>,
        targets: &'a ArrayBase<T, Ix1>,
    ) -> Self {
        self.0.validation = Some((records.view(), targets.view()));
        self
    }
}

impl<'a, M: ReferenceModel> ParamGuard for ProjPredParams<'a, M> {
    type Checked = ProjPredValidParams<'a, M>;
    type Error = ProjPredError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let available = self.0.reference.sigma_draws().len();
        if let Some(requested) = self.0.n_search_draws {
            if requested == 0 || requested > available {
                return Err(ProjPredError::InvalidSearchDraws {
                    requested,
                    available,
                });
            }
        }
        if let Some((records, targets)) = &self.0.validation {
            if records.nrows() != targets.len() {
                return Err(varsel::Error::MismatchedShapes {
                    expected: records.nrows(),
                    actual: targets.len(),
                }
                .into());
            }
            if records.nrows() == 0 {
                return Err(ProjPredError::NotEnoughSamples);
            }
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
