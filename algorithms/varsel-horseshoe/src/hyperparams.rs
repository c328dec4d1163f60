#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::ParamGuard;

use crate::error::{HorseshoeError, Result};

/// Checked settings of the horseshoe Gibbs sampler
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct HorseshoeValidParams {
    pub(crate) n_draws: usize,
    pub(crate) burn_in: usize,
    pub(crate) thin: usize,
    pub(crate) global_scale: f64,
    pub(crate) seed: u64,
    pub(crate) n_chains: usize,
}

impl HorseshoeValidParams {
    /// Retained draws per chain
    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    pub fn thin(&self) -> usize {
        self.thin
    }

    /// Scale `tau0` of the half-Cauchy prior on the global shrinkage
    pub fn global_scale(&self) -> f64 {
        self.global_scale
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn n_chains(&self) -> usize {
        self.n_chains
    }
}

/// Settings of the horseshoe Gibbs sampler
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [n_draws](Self::n_draws) | `1000` | Retained draws per chain | `[1, inf)` |
/// | [burn_in](Self::burn_in) | `1000` | Discarded warm-up iterations per chain | `[0, inf)` |
/// | [thin](Self::thin) | `1` | Keep every `thin`-th iteration after warm-up | `[1, inf)` |
/// | [global_scale](Self::global_scale) | `1.0` | Scale of the half-Cauchy prior on `tau` | `(0, inf)` |
/// | [seed](Self::seed) | `42` | Seed of the first chain, chain `c` uses `seed + c` | any |
/// | [n_chains](Self::n_chains) | `1` | Number of independent chains, run one after another | `[1, inf)` |
///
/// # Errors
///
/// Checking fails with [`InvalidDraws`](HorseshoeError::InvalidDraws),
/// [`InvalidThin`](HorseshoeError::InvalidThin), [`InvalidChains`](HorseshoeError::InvalidChains)
/// or [`InvalidGlobalScale`](HorseshoeError::InvalidGlobalScale).
#[derive(Clone, Debug, PartialEq)]
pub struct HorseshoeParams(pub(crate) HorseshoeValidParams);

impl Default for HorseshoeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl HorseshoeParams {
    pub fn new() -> Self {
        Self(HorseshoeValidParams {
            n_draws: 1000,
            burn_in: 1000,
            thin: 1,
            global_scale: 1.0,
            seed: 42,
            n_chains: 1,
        })
    }

    pub fn n_draws(mut self, n_draws: usize) -> Self {
        self.0.n_draws = n_draws;
        self
    }

    pub fn burn_in(mut self, burn_in: usize) -> Self {
        self.0.burn_in = burn_in;
        self
    }

    pub fn thin(mut self, thin: usize) -> Self {
        self.0.thin = thin;
        self
    }

    /// Set the prior scale of the global shrinkage parameter.
    ///
    /// Smaller values express a prior belief in fewer relevant covariates.
    pub fn global_scale(mut self, global_scale: f64) -> Self {
        self.0.global_scale = global_scale;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    pub fn n_chains(mut self, n_chains: usize) -> Self {
        self.0.n_chains = n_chains;
        self
    }
}

impl ParamGuard for HorseshoeParams {
    type Checked = HorseshoeValidParams;
    type Error = HorseshoeError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_draws == 0 {
            Err(HorseshoeError::InvalidDraws)
        } else if self.0.thin == 0 {
            Err(HorseshoeError::InvalidThin)
        } else if self.0.n_chains == 0 {
            Err(HorseshoeError::InvalidChains)
        } else if !(self.0.global_scale.is_finite() && self.0.global_scale > 0.0) {
            Err(HorseshoeError::InvalidGlobalScale(self.0.global_scale))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = HorseshoeParams::new().check().unwrap();
        assert_eq!(params.n_draws(), 1000);
        assert_eq!(params.burn_in(), 1000);
        assert_eq!(params.thin(), 1);
        assert_eq!(params.n_chains(), 1);
        assert!((params.global_scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(matches!(
            HorseshoeParams::new().n_draws(0).check(),
            Err(HorseshoeError::InvalidDraws)
        ));
        assert!(matches!(
            HorseshoeParams::new().thin(0).check(),
            Err(HorseshoeError::InvalidThin)
        ));
        assert!(matches!(
            HorseshoeParams::new().n_chains(0).check(),
            Err(HorseshoeError::InvalidChains)
        ));
        assert!(matches!(
            HorseshoeParams::new().global_scale(0.0).check(),
            Err(HorseshoeError::InvalidGlobalScale(_))
        ));
        assert!(HorseshoeParams::new().global_scale(f64::NAN).check().is_err());
        // no warm-up is allowed
        assert!(HorseshoeParams::new().burn_in(0).check().is_ok());
    }
}
