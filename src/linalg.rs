//! Dense linear algebra helpers
//!
//! Thin wrappers around the pure-Rust decompositions of `linfa-linalg`. All estimators in the
//! workspace go through these functions, so a non positive-definite matrix is always reported as
//! an [`Error::Linalg`](crate::Error::Linalg) instead of a panic.

use linfa_linalg::{
    cholesky::Cholesky,
    eigh::{EigSort, Eigh},
    triangular::{SolveTriangularInplace, UPLO},
};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

use crate::error::Result;
use crate::Float;

/// Lower triangular Cholesky factor `L` with `a = L L^T`
pub fn cholesky_lower<F: Float, D: Data<Elem = F>>(a: &ArrayBase<D, Ix2>) -> Result<Array2<F>> {
    Ok(a.cholesky()?)
}

/// Solve `L x = b` for every column of `b`
pub fn solve_lower<F: Float, D: Data<Elem = F>>(
    l: &ArrayBase<D, Ix2>,
    mut b: Array2<F>,
) -> Result<Array2<F>> {
    l.solve_triangular_inplace(&mut b, UPLO::Lower)?;
    Ok(b)
}

/// Solve `L^T x = b` for every column of `b`
pub fn solve_lower_transposed<F: Float, D: Data<Elem = F>>(
    l: &ArrayBase<D, Ix2>,
    mut b: Array2<F>,
) -> Result<Array2<F>> {
    l.t().solve_triangular_inplace(&mut b, UPLO::Upper)?;
    Ok(b)
}

/// Solve `a x = b` given the Cholesky factor `l` of `a`
pub fn cho_solve<F: Float, D: Data<Elem = F>, S: Data<Elem = F>>(
    l: &ArrayBase<D, Ix2>,
    b: &ArrayBase<S, Ix1>,
) -> Result<Array1<F>> {
    let b = b.to_owned().insert_axis(Axis(1));
    let z = solve_lower(l, b)?;
    let x = solve_lower_transposed(l, z)?;

    Ok(x.index_axis_move(Axis(1), 0))
}

/// Solve `a x = b` for a symmetric positive definite `a`
pub fn solve_spd<F: Float, D: Data<Elem = F>, S: Data<Elem = F>>(
    a: &ArrayBase<D, Ix2>,
    b: &ArrayBase<S, Ix1>,
) -> Result<Array1<F>> {
    let l = cholesky_lower(a)?;
    cho_solve(&l, b)
}

/// Inverse of a symmetric positive definite matrix
pub fn inverse_spd<F: Float, D: Data<Elem = F>>(a: &ArrayBase<D, Ix2>) -> Result<Array2<F>> {
    let l = cholesky_lower(a)?;
    let z = solve_lower(&l, Array2::eye(a.nrows()))?;
    solve_lower_transposed(&l, z)
}

/// Eigendecomposition of a symmetric matrix
///
/// Eigenvalues are sorted in descending order, the eigenvectors are the columns of the returned
/// matrix in the same order.
pub fn eigh_descending<F: Float, D: Data<Elem = F>>(
    a: &ArrayBase<D, Ix2>,
) -> Result<(Array1<F>, Array2<F>)> {
    Ok(a.eigh()?.sort_eig_desc())
}

/// Check whether a symmetric matrix is positive semi-definite
///
/// Eigenvalues down to `-tol * max(1, |largest eigenvalue|)` are accepted as zero. Matrices which
/// are not symmetric (up to the same tolerance) are never positive semi-definite.
pub fn is_positive_semidefinite<F: Float, D: Data<Elem = F>>(
    a: &ArrayBase<D, Ix2>,
    tol: F,
) -> Result<bool> {
    if !a.is_square() {
        return Ok(false);
    }
    if a.is_empty() {
        return Ok(true);
    }

    let scale = a.iter().fold(F::one(), |acc, x| acc.max(x.abs()));
    let symmetric = a
        .indexed_iter()
        .all(|((i, j), x)| (*x - a[(j, i)]).abs() <= tol * scale);
    if !symmetric {
        return Ok(false);
    }

    let (eigvals, _) = eigh_descending(a)?;
    let largest = eigvals.iter().fold(F::one(), |acc, x| acc.max(x.abs()));

    Ok(eigvals.iter().all(|x| *x >= -tol * largest))
}
