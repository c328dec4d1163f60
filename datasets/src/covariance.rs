use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Which pairs of covariates are associated
///
/// A symmetric boolean matrix with a `false` diagonal. An entry `(i, j)` set to `true` means the
/// covariates `i` and `j` share the association strength in [`structured_covariance`].
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CovariancePattern {
    adjacency: Array2<bool>,
}

impl CovariancePattern {
    /// No associated pairs
    pub fn independent(nfeatures: usize) -> Self {
        CovariancePattern {
            adjacency: Array2::from_elem((nfeatures, nfeatures), false),
        }
    }

    /// Every distinct pair is associated
    pub fn full(nfeatures: usize) -> Self {
        CovariancePattern {
            adjacency: Array2::from_shape_fn((nfeatures, nfeatures), |(i, j)| i != j),
        }
    }

    /// Consecutive blocks of the given sizes, covariates are associated within a block only
    ///
    /// ```ignore
    /// // x1, x2, x3 associated; x4, x5 associated; x6 independent
    /// let pattern = CovariancePattern::blocks(&[3, 2, 1]);
    /// ```
    pub fn blocks(sizes: &[usize]) -> Self {
        let block_of = sizes
            .iter()
            .enumerate()
            .flat_map(|(block, size)| std::iter::repeat(block).take(*size))
            .collect::<Vec<_>>();
        let nfeatures = block_of.len();

        CovariancePattern {
            adjacency: Array2::from_shape_fn((nfeatures, nfeatures), |(i, j)| {
                i != j && block_of[i] == block_of[j]
            }),
        }
    }

    /// Neighbouring covariates `i` and `i + 1` are associated
    pub fn chain(nfeatures: usize) -> Self {
        CovariancePattern {
            adjacency: Array2::from_shape_fn((nfeatures, nfeatures), |(i, j)| {
                i + 1 == j || j + 1 == i
            }),
        }
    }

    /// Associate the listed pairs, order within a pair does not matter
    pub fn from_edges(nfeatures: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut adjacency = Array2::from_elem((nfeatures, nfeatures), false);
        for &(i, j) in edges {
            if i >= nfeatures || j >= nfeatures {
                return Err(DatasetError::InvalidPattern(format!(
                    "edge ({}, {}) out of range for {} covariates",
                    i, j, nfeatures
                )));
            }
            if i == j {
                return Err(DatasetError::InvalidPattern(format!(
                    "self association of covariate {}",
                    i
                )));
            }
            adjacency[(i, j)] = true;
            adjacency[(j, i)] = true;
        }

        Ok(CovariancePattern { adjacency })
    }

    /// Use an explicit adjacency matrix
    ///
    /// The matrix must be square, symmetric and have a `false` diagonal.
    pub fn from_matrix(adjacency: Array2<bool>) -> Result<Self> {
        if !adjacency.is_square() {
            return Err(DatasetError::InvalidPattern(format!(
                "matrix of shape {:?} is not square",
                adjacency.dim()
            )));
        }
        if adjacency.diag().iter().any(|x| *x) {
            return Err(DatasetError::InvalidPattern(
                "diagonal must be false".to_string(),
            ));
        }
        let symmetric = adjacency
            .indexed_iter()
            .all(|((i, j), x)| *x == adjacency[(j, i)]);
        if !symmetric {
            return Err(DatasetError::InvalidPattern(
                "matrix is not symmetric".to_string(),
            ));
        }

        Ok(CovariancePattern { adjacency })
    }

    pub fn nfeatures(&self) -> usize {
        self.adjacency.nrows()
    }

    pub fn is_associated(&self, i: usize, j: usize) -> bool {
        self.adjacency[(i, j)]
    }

    /// Number of associated (unordered) pairs
    pub fn npairs(&self) -> usize {
        self.adjacency.iter().filter(|x| **x).count() / 2
    }

    pub fn as_matrix(&self) -> &Array2<bool> {
        &self.adjacency
    }
}

/// Build a covariance matrix from a pattern, standard deviations and an association strength
///
/// The result has `sd[i]^2` on the diagonal and `association * sd[i] * sd[j]` wherever the
/// pattern associates `i` and `j`, zero elsewhere. The association is therefore the correlation
/// of every associated pair.
///
/// The matrix is not guaranteed to be positive semi-definite, use
/// [`is_positive_semidefinite`] before sampling when the pattern is dense and the association
/// negative.
///
/// # Errors
///
/// * [`DatasetError::MismatchedLength`] if `sd` does not have one entry per covariate
/// * [`DatasetError::InvalidStandardDeviation`] if a standard deviation is not positive
/// * [`DatasetError::InvalidAssociation`] if the association lies outside `[-1, 1]`
pub fn structured_covariance<D: Data<Elem = f64>>(
    pattern: &CovariancePattern,
    sd: &ArrayBase<D, Ix1>,
    association: f64,
) -> Result<Array2<f64>> {
    let p = pattern.nfeatures();
    if sd.len() != p {
        return Err(DatasetError::MismatchedLength {
            expected: p,
            actual: sd.len(),
        });
    }
    if let Some(bad) = sd.iter().find(|x| !(x.is_finite() && **x > 0.0)) {
        return Err(DatasetError::InvalidStandardDeviation(*bad));
    }
    if !(association.is_finite() && (-1.0..=1.0).contains(&association)) {
        return Err(DatasetError::InvalidAssociation(association));
    }

    Ok(Array2::from_shape_fn((p, p), |(i, j)| {
        if i == j {
            sd[i] * sd[i]
        } else if pattern.is_associated(i, j) {
            association * sd[i] * sd[j]
        } else {
            0.0
        }
    }))
}

/// Check a covariance matrix for positive semi-definiteness
///
/// Eigenvalues down to `-tol` times the largest eigenvalue are treated as zero.
pub fn is_positive_semidefinite<D: Data<Elem = f64>>(
    cov: &ArrayBase<D, Ix2>,
    tol: f64,
) -> Result<bool> {
    Ok(varsel::linalg::is_positive_semidefinite(cov, tol)?)
}
