//! Dense matrix with contiguous row-major storage.
//!
//! Every operation allocates its result and fills it through the
//! [`BlockEngine`], one closure evaluation per destination cell.

use std::ops::{Index, IndexMut};

use crate::config::Parallelism;
use crate::core::Scalar;
use crate::core::traits::{Matrix, check_bounds, check_same_shape};
use crate::error::{MatrixError, Result};
use crate::parallel::BlockEngine;

/// Fully materialised `rows × cols` matrix.
#[derive(Debug, Clone)]
pub struct DenseMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
    par: Parallelism,
}

impl<T: Scalar> DenseMatrix<T> {
    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
            par: Parallelism::default(),
        }
    }

    /// Build from row-major storage; `data.len()` must equal `rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::DimensionMismatch {
                op: "from_row_major",
                left: (rows, cols),
                right: (data.len(), 1),
            });
        }
        Ok(Self {
            rows,
            cols,
            data,
            par: Parallelism::default(),
        })
    }

    /// Sequentially evaluate `f(i, j)` for every cell.
    pub fn from_fn<F: FnMut(usize, usize) -> T>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self {
            rows,
            cols,
            data,
            par: Parallelism::default(),
        }
    }

    pub fn with_parallelism(mut self, par: Parallelism) -> Self {
        self.par = par;
        self
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Row-major view of all cells.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Result of a block-parallel fill, carrying this matrix's defaults.
    fn derive<F>(&self, rows: usize, cols: usize, par: Parallelism, f: F) -> DenseMatrix<T>
    where
        F: Fn(usize, usize) -> T + Sync,
    {
        BlockEngine::new(par).map(rows, cols, f).with_parallelism(self.par)
    }
}

impl<T: Scalar> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[i * self.cols + j]
    }
}

impl<T: Scalar> IndexMut<(usize, usize)> for DenseMatrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[i * self.cols + j]
    }
}

impl<T: Scalar> PartialEq for DenseMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.data == other.data
    }
}

impl<T: Scalar> Matrix<T> for DenseMatrix<T> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn value(&self, row: usize, col: usize) -> T {
        self[(row, col)]
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        check_bounds(self.shape(), row, col)?;
        self[(row, col)] = value;
        Ok(())
    }

    fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        self.row(row).iter().copied().enumerate()
    }

    fn col_entries(&self, col: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        (0..self.rows).map(move |i| (i, self[(i, col)]))
    }

    fn parallelism(&self) -> Parallelism {
        self.par
    }

    fn parallelism_mut(&mut self) -> &mut Parallelism {
        &mut self.par
    }

    fn add_scalar_with(&self, a: T, par: Parallelism) -> Result<DenseMatrix<T>> {
        Ok(self.derive(self.rows, self.cols, par, |i, j| self[(i, j)] + a))
    }

    fn add_with<M: Matrix<T>>(&self, other: &M, par: Parallelism) -> Result<DenseMatrix<T>> {
        check_same_shape("add", self.shape(), other.shape())?;
        Ok(self.derive(self.rows, self.cols, par, |i, j| self[(i, j)] + other.value(i, j)))
    }

    fn scale_with(&self, a: T, par: Parallelism) -> Result<DenseMatrix<T>> {
        Ok(self.derive(self.rows, self.cols, par, |i, j| self[(i, j)] * a))
    }

    /// Sums only over the entries `other` reports for each column, so a
    /// sparse right operand skips its zeros.
    fn multiply_with<M: Matrix<T>>(&self, other: &M, par: Parallelism) -> Result<DenseMatrix<T>> {
        if self.cols != other.rows() {
            return Err(MatrixError::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(self.derive(self.rows, other.cols(), par, |i, j| {
            other
                .col_entries(j)
                .fold(T::zero(), |acc, (r, v)| acc + self[(i, r)] * v)
        }))
    }

    fn transpose_with(&self, par: Parallelism) -> Self {
        self.derive(self.cols, self.rows, par, |i, j| self[(j, i)])
    }

    fn inverse_with(&self, par: Parallelism) -> Result<DenseMatrix<T>> {
        crate::solver::spd_inverse(self, par).map(|inv| inv.with_parallelism(self.par))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::factory::identity;

    fn sample() -> DenseMatrix<f64> {
        DenseMatrix::from_row_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn zeros_are_zero() {
        let m = DenseMatrix::<f64>::zeros(3, 4);
        assert_eq!(m.shape(), (3, 4));
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_row_major_checks_length() {
        let err = DenseMatrix::from_row_major(2, 2, vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, MatrixError::DimensionMismatch { op: "from_row_major", .. }));
    }

    #[test]
    fn set_and_get_are_checked() {
        let mut m = DenseMatrix::<f64>::zeros(2, 2);
        m.set(1, 0, 3.5).unwrap();
        assert_eq!(m.get(1, 0), Ok(3.5));
        assert_eq!(
            m.set(2, 0, 1.0),
            Err(MatrixError::IndexOutOfBounds { row: 2, col: 0, rows: 2, cols: 2 })
        );
        assert!(m.get(0, 2).is_err());
    }

    #[test]
    fn scalar_ops() {
        let m = sample();
        assert_eq!(m.add_scalar(1.0).unwrap().as_slice(), &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(m.scale(-2.0).unwrap().as_slice(), &[-2.0, -4.0, -6.0, -8.0, -10.0, -12.0]);
        // operands are left untouched
        assert_eq!(m, sample());
    }

    #[test]
    fn add_requires_equal_shapes() {
        let m = sample();
        let sum = m.add(&m).unwrap();
        assert_eq!(sum.as_slice(), &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
        let err = m.add(&DenseMatrix::<f64>::zeros(3, 2)).unwrap_err();
        assert_eq!(
            err,
            MatrixError::DimensionMismatch { op: "add", left: (2, 3), right: (3, 2) }
        );
    }

    #[test]
    fn transpose_swaps_indices() {
        let t = sample().transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.transpose(), sample());
    }

    #[test]
    fn multiply_small() {
        let m = sample();
        let p = m.multiply(&m.transpose()).unwrap();
        assert_eq!(p.as_slice(), &[14.0, 32.0, 32.0, 77.0]);
        let err = m.multiply(&m).unwrap_err();
        assert!(matches!(err, MatrixError::DimensionMismatch { op: "multiply", .. }));
    }

    #[test]
    fn results_inherit_receiver_defaults() {
        let mut m = sample();
        m.set_worker_count(3);
        m.set_blocksize(5);
        let out = m.scale_with(2.0, Parallelism::new(1, 1)).unwrap();
        assert_eq!(out.worker_count(), 3);
        assert_eq!(out.blocksize(), 5);
    }

    #[test]
    fn inverse_of_identity_is_exact() {
        let i3 = identity::<f64>(3);
        assert_eq!(i3.inverse().unwrap(), i3);
    }

    #[test]
    fn inverse_requires_square() {
        assert_eq!(
            sample().inverse().unwrap_err(),
            MatrixError::NonSquareMatrix { rows: 2, cols: 3 }
        );
    }
}
