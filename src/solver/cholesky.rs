//! Cholesky decomposition `M = L Lᵀ` scheduled as an anti-diagonal wavefront.
//!
//! `L[i,k]` reads only `L[i,j]` and `L[k,j]` with `j < k <= i`, whose index
//! sums are strictly below `i + k`. Cells are therefore grouped into phases by
//! `s = i + k`; the cells of one phase are independent and are claimed by
//! workers in parallel, and a phase starts only after the previous one has
//! been fully written.

use log::{debug, trace, warn};

use crate::config::Parallelism;
use crate::core::traits::check_square;
use crate::core::{Matrix, Scalar};
use crate::error::{MatrixError, Result};
use crate::matrix::DenseMatrix;
use crate::parallel::claim;

/// Per-worker output of one phase.
struct PhaseOutput<T> {
    cells: Vec<(usize, usize, T)>,
    failure: Option<MatrixError>,
}

impl<T> Default for PhaseOutput<T> {
    fn default() -> Self {
        Self { cells: Vec::new(), failure: None }
    }
}

/// Lower-triangular cells `(i, k)` of an `n × n` matrix with `i + k == s`.
pub(crate) fn phase_cells(n: usize, s: usize) -> Vec<(usize, usize)> {
    let first = (s + 1).saturating_sub(n);
    (first..=s / 2).map(|k| (s - k, k)).collect()
}

/// Lower-triangular factor of a symmetric positive-definite matrix.
///
/// Only the lower triangle of `m` is read. The input must be SPD; a pivot that
/// comes out zero, negative or NaN fails with [`MatrixError::NumericDomain`] and no
/// further phases are run.
pub fn cholesky<T, M>(m: &M, par: Parallelism) -> Result<DenseMatrix<T>>
where
    T: Scalar,
    M: Matrix<T>,
{
    let n = check_square(m.shape())?;
    let mut l = DenseMatrix::zeros(n, n).with_parallelism(par);
    if n == 0 {
        return Ok(l);
    }
    let workers = par.effective_workers();
    debug!("cholesky: {n}x{n}, {} phases, {workers} workers", 2 * n - 1);

    for s in 0..2 * n - 1 {
        let cells = phase_cells(n, s);
        trace!("cholesky: phase {s}, {} cells", cells.len());
        let factor = &l;
        let outputs = claim(cells.len(), workers, |idx, out: &mut PhaseOutput<T>| {
            let (i, k) = cells[idx];
            match entry(m, factor, i, k) {
                Ok(v) => out.cells.push((i, k, v)),
                Err(e) => out.failure = Some(e),
            }
        });

        let failure = outputs
            .iter()
            .filter_map(|out| out.failure.clone())
            .min_by_key(|e| match e {
                MatrixError::NumericDomain { row, .. } => *row,
                _ => usize::MAX,
            });
        if let Some(e) = failure {
            warn!("cholesky: {e}");
            return Err(e);
        }
        for out in outputs {
            for (i, k, v) in out.cells {
                l[(i, k)] = v;
            }
        }
    }
    Ok(l)
}

fn entry<T, M>(m: &M, l: &DenseMatrix<T>, i: usize, k: usize) -> Result<T>
where
    T: Scalar,
    M: Matrix<T>,
{
    let dot = (0..k).fold(T::zero(), |acc, j| acc + l[(i, j)] * l[(k, j)]);
    if i == k {
        let pivot = m.value(i, i) - dot;
        if pivot <= T::zero() || pivot.is_nan() {
            return Err(MatrixError::NumericDomain {
                row: i,
                value: pivot.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(pivot.sqrt())
    } else {
        Ok((m.value(i, k) - dot) / l[(k, k)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{SparseMatrix, identity};
    use approx::assert_abs_diff_eq;

    #[test]
    fn phases_cover_lower_triangle_once() {
        for n in 1..8 {
            let mut hits = vec![0; n * n];
            for s in 0..2 * n - 1 {
                for (i, k) in phase_cells(n, s) {
                    assert!(k <= i && i < n);
                    assert_eq!(i + k, s);
                    hits[i * n + k] += 1;
                }
            }
            for i in 0..n {
                for k in 0..n {
                    assert_eq!(hits[i * n + k], usize::from(k <= i), "n={n} cell ({i},{k})");
                }
            }
        }
    }

    #[test]
    fn known_factor() {
        // [[4, 12, -16], [12, 37, -43], [-16, -43, 98]] = L Lᵀ with L = [[2,0,0],[6,1,0],[-8,5,3]]
        let m = DenseMatrix::from_row_major(
            3,
            3,
            vec![4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0],
        )
        .unwrap();
        for workers in [1, 4] {
            let l = cholesky(&m, Parallelism::new(workers, 1)).unwrap();
            let expected = [2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0];
            for (got, want) in l.as_slice().iter().zip(expected) {
                assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn identity_factor_is_identity() {
        let id = identity::<f64>(5);
        assert_eq!(cholesky(&id, Parallelism::default()).unwrap(), id);
    }

    #[test]
    fn accepts_sparse_input() {
        let mut m = SparseMatrix::<f64>::new(2, 2);
        m.set(0, 0, 9.0).unwrap();
        m.set(1, 1, 16.0).unwrap();
        let l = cholesky(&m, Parallelism::sequential()).unwrap();
        assert_eq!(l.as_slice(), &[3.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn non_square_is_rejected() {
        let m = DenseMatrix::<f64>::zeros(2, 3);
        assert_eq!(
            cholesky(&m, Parallelism::default()).unwrap_err(),
            MatrixError::NonSquareMatrix { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn indefinite_input_reports_pivot() {
        // eigenvalues 3 and -1
        let m = DenseMatrix::from_row_major(2, 2, vec![1.0, 2.0, 2.0, 1.0]).unwrap();
        match cholesky(&m, Parallelism::new(2, 1)) {
            Err(MatrixError::NumericDomain { row, value }) => {
                assert_eq!(row, 1);
                assert_abs_diff_eq!(value, -3.0, epsilon = 1e-12);
            }
            other => panic!("expected NumericDomain, got {other:?}"),
        }
    }

    #[test]
    fn singular_input_reports_zero_pivot() {
        // positive semidefinite but singular
        let m = DenseMatrix::from_row_major(2, 2, vec![1.0_f64, 1.0, 1.0, 1.0]).unwrap();
        match cholesky(&m, Parallelism::new(2, 1)) {
            Err(MatrixError::NumericDomain { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, 0.0);
            }
            other => panic!("expected NumericDomain, got {other:?}"),
        }
        assert!(matches!(m.inverse(), Err(MatrixError::NumericDomain { row: 1, .. })));
    }

    #[test]
    fn empty_matrix_factors_to_empty() {
        let m = DenseMatrix::<f64>::zeros(0, 0);
        assert_eq!(cholesky(&m, Parallelism::default()).unwrap().nrows(), 0);
    }
}
