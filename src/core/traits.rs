//! Core matrix traits for blockmat.

use std::fmt::Debug;

use num_traits::{Float, FromPrimitive};

use crate::config::Parallelism;
use crate::error::{MatrixError, Result};
use crate::matrix::DenseMatrix;

/// Element type of a matrix.
pub trait Scalar: Float + FromPrimitive + Send + Sync + Debug + 'static {}

impl<T> Scalar for T where T: Float + FromPrimitive + Send + Sync + Debug + 'static {}

/// Operations every matrix representation provides.
///
/// Operations never mutate the receiver or their argument; each returns a
/// freshly allocated result. Shape preconditions are checked before any
/// parallel work is scheduled.
pub trait Matrix<T: Scalar>: Sync {
    /// Number of rows.
    fn rows(&self) -> usize;
    /// Number of columns.
    fn cols(&self) -> usize;

    fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Read a cell that is known to be in range.
    ///
    /// # Panics
    /// Panics if `(row, col)` lies outside the matrix.
    fn value(&self, row: usize, col: usize) -> T;

    /// Checked read of a cell.
    fn get(&self, row: usize, col: usize) -> Result<T> {
        check_bounds(self.shape(), row, col)?;
        Ok(self.value(row, col))
    }

    /// Checked write of a cell.
    fn set(&mut self, row: usize, col: usize, value: T) -> Result<()>;

    /// `(col, value)` pairs of row `row`, ascending by column.
    ///
    /// Dense storage yields every column; sparse storage yields only the
    /// stored nonzeros.
    fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_;

    /// `(row, value)` pairs of column `col`, ascending by row.
    fn col_entries(&self, col: usize) -> impl Iterator<Item = (usize, T)> + '_;

    /// Defaults used by operations invoked without explicit options.
    fn parallelism(&self) -> Parallelism;
    fn parallelism_mut(&mut self) -> &mut Parallelism;

    fn worker_count(&self) -> usize {
        self.parallelism().workers
    }
    fn set_worker_count(&mut self, workers: usize) {
        self.parallelism_mut().workers = workers;
    }
    fn blocksize(&self) -> usize {
        self.parallelism().blocksize
    }
    fn set_blocksize(&mut self, blocksize: usize) {
        self.parallelism_mut().blocksize = blocksize;
    }

    /// `dst[i,j] = self[i,j] + a`
    fn add_scalar_with(&self, a: T, par: Parallelism) -> Result<DenseMatrix<T>>;
    fn add_scalar(&self, a: T) -> Result<DenseMatrix<T>> {
        self.add_scalar_with(a, self.parallelism())
    }

    /// `dst[i,j] = self[i,j] + other[i,j]`; shapes must match.
    fn add_with<M: Matrix<T>>(&self, other: &M, par: Parallelism) -> Result<DenseMatrix<T>>;
    fn add<M: Matrix<T>>(&self, other: &M) -> Result<DenseMatrix<T>> {
        self.add_with(other, self.parallelism())
    }

    /// `dst[i,j] = self[i,j] * a`
    fn scale_with(&self, a: T, par: Parallelism) -> Result<DenseMatrix<T>>;
    fn scale(&self, a: T) -> Result<DenseMatrix<T>> {
        self.scale_with(a, self.parallelism())
    }

    /// Matrix product `self · other`; requires `self.cols() == other.rows()`.
    fn multiply_with<M: Matrix<T>>(&self, other: &M, par: Parallelism) -> Result<DenseMatrix<T>>;
    fn multiply<M: Matrix<T>>(&self, other: &M) -> Result<DenseMatrix<T>> {
        self.multiply_with(other, self.parallelism())
    }

    fn transpose_with(&self, par: Parallelism) -> Self
    where
        Self: Sized;
    fn transpose(&self) -> Self
    where
        Self: Sized,
    {
        self.transpose_with(self.parallelism())
    }

    /// Inverse of a symmetric positive-definite matrix.
    fn inverse_with(&self, par: Parallelism) -> Result<DenseMatrix<T>>;
    fn inverse(&self) -> Result<DenseMatrix<T>> {
        self.inverse_with(self.parallelism())
    }
}

pub(crate) fn check_bounds(shape: (usize, usize), row: usize, col: usize) -> Result<()> {
    let (rows, cols) = shape;
    if row < rows && col < cols {
        Ok(())
    } else {
        Err(MatrixError::IndexOutOfBounds { row, col, rows, cols })
    }
}

pub(crate) fn check_same_shape(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(MatrixError::DimensionMismatch { op, left, right })
    }
}

pub(crate) fn check_square(shape: (usize, usize)) -> Result<usize> {
    let (rows, cols) = shape;
    if rows == cols {
        Ok(rows)
    } else {
        Err(MatrixError::NonSquareMatrix { rows, cols })
    }
}
