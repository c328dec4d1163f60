//! Principal Component Analysis
//!
//! Principal Component Analysis reduces the dimensionality of the data while retaining most of
//! the variance. The data is centred and projected onto the leading eigenvectors of its sample
//! covariance matrix. On correlated covariates a few components carry most of the variance,
//! which is what principal components regression builds on.
//!
//! # Example
//!
//! ```ignore
//! use varsel::traits::{Fit, Predict};
//! use varsel_reduction::Pca;
//!
//! // project onto the direction of maximal spread
//! let embedding = Pca::params(1).fit(&dataset)?;
//!
//! // reduce dimensionality of the records
//! let scores = embedding.predict(dataset.records());
//! ```
use log::debug;
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use varsel::{
    linalg,
    traits::{Fit, PredictInplace},
    DatasetBase, Float, ParamGuard,
};

use crate::error::{ReductionError, Result};

/// Checked principal component analysis parameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PcaValidParams {
    embedding_size: usize,
    apply_whitening: bool,
}

impl PcaValidParams {
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }

    pub fn whiten(&self) -> bool {
        self.apply_whitening
    }
}

/// Principal component analysis parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PcaParams(PcaValidParams);

impl PcaParams {
    /// Apply whitening to the embedding vector
    ///
    /// Whitening will scale the eigenvectors such that the covariance of the projected
    /// training data is the identity.
    pub fn whiten(mut self, apply: bool) -> Self {
        self.0.apply_whitening = apply;

        self
    }
}

impl ParamGuard for PcaParams {
    type Checked = PcaValidParams;
    type Error = ReductionError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.embedding_size == 0 {
            Err(ReductionError::NonPositiveEmbeddingSize)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Flip the sign of every eigenvector so that its largest entry is positive
fn orient<F: Float>(vectors: &mut Array2<F>) {
    for mut col in vectors.columns_mut() {
        let pivot = col
            .iter()
            .fold(F::zero(), |m, v| if v.abs() > m.abs() { *v } else { m });
        if pivot < F::zero() {
            col.mapv_inplace(|v| -v);
        }
    }
}

/// Fit a PCA model given a dataset
///
/// The Principal Component Analysis takes the records of a dataset and tries to find the best
/// fit in a lower dimensional space such that the maximal variance is retained.
///
/// # Returns
///
/// A fitted PCA model with origin and hyperplane, or
/// [`DimensionIncrease`](ReductionError::DimensionIncrease) when more components are requested
/// than there are features.
impl<F: Float, D: Data<Elem = F>, T> Fit<ArrayBase<D, Ix2>, T, ReductionError> for PcaValidParams {
    type Object = Pca<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Pca<F>> {
        let x = dataset.records();
        let (n_samples, n_features) = x.dim();
        if n_samples < 2 {
            return Err(ReductionError::NotEnoughSamples);
        }
        if self.embedding_size > n_features {
            return Err(ReductionError::DimensionIncrease(
                self.embedding_size,
                n_features,
            ));
        }

        // calculate mean of data and subtract it
        let mean = x.mean_axis(Axis(0)).ok_or(ReductionError::NotEnoughSamples)?;
        let centered = x - &mean;
        let covariance = centered.t().dot(&centered) / F::cast(n_samples - 1);

        let (eigenvalues, mut eigenvectors) = linalg::eigh_descending(&covariance)?;
        orient(&mut eigenvectors);

        // the spectrum of a covariance matrix is non-negative up to rounding
        let eigenvalues = eigenvalues.mapv(|v| v.max(F::zero()));
        let total_variance = eigenvalues.sum();
        let explained_variance = eigenvalues.slice(s![..self.embedding_size]).to_owned();
        let components = eigenvectors
            .slice(s![.., ..self.embedding_size])
            .t()
            .to_owned();

        let mut embedding = components.clone();
        if self.apply_whitening {
            // cut eigenvalues to avoid numerical problems
            for (mut row, var) in embedding.axis_iter_mut(Axis(0)).zip(explained_variance.iter()) {
                row /= var.max(F::cast(1e-16)).sqrt();
            }
        }
        debug!(
            "kept {} of {} components",
            self.embedding_size, n_features
        );

        Ok(Pca {
            embedding,
            components,
            explained_variance,
            total_variance,
            mean,
        })
    }
}

/// Fitted Principal Component Analysis model
///
/// The model contains the mean and hyperplane for the projection of data.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Pca<F> {
    embedding: Array2<F>,
    components: Array2<F>,
    explained_variance: Array1<F>,
    total_variance: F,
    mean: Array1<F>,
}

impl Pca<f64> {
    /// Create default parameter set
    ///
    /// # Parameters
    ///
    ///  * `embedding_size`: the target dimensionality
    pub fn params(embedding_size: usize) -> PcaParams {
        PcaParams(PcaValidParams {
            embedding_size,
            apply_whitening: false,
        })
    }
}

impl<F: Float> Pca<F> {
    /// Principal axes with shape `(embedding_size, n_features)`, one unit vector per row
    pub fn components(&self) -> &Array2<F> {
        &self.components
    }

    /// Return the amount of explained variance per component
    pub fn explained_variance(&self) -> &Array1<F> {
        &self.explained_variance
    }

    /// Return the explained variance per component relative to the total variance of the data
    pub fn explained_variance_ratio(&self) -> Array1<F> {
        if self.total_variance > F::zero() {
            &self.explained_variance / self.total_variance
        } else {
            Array1::zeros(self.explained_variance.len())
        }
    }

    pub fn mean(&self) -> &Array1<F> {
        &self.mean
    }

    pub fn embedding_size(&self) -> usize {
        self.components.nrows()
    }
}

/// Project a matrix to lower dimensional space
///
/// The projection first centers and then projects the data.
impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array2<F>> for Pca<F> {
    fn predict_inplace(&self, records: &ArrayBase<D, Ix2>, targets: &mut Array2<F>) {
        assert_eq!(
            targets.dim(),
            (records.nrows(), self.embedding.nrows()),
            "The number of data points must match the number of output targets."
        );
        *targets = (records - &self.mean).dot(&self.embedding.t());
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array2<F> {
        Array2::zeros((x.nrows(), self.embedding.nrows()))
    }
}
