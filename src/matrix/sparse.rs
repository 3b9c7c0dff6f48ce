// Sparse matrix with a dual (row-keyed and column-keyed) index of nonzeros.

use std::collections::BTreeMap;

use crate::config::Parallelism;
use crate::core::Scalar;
use crate::core::traits::{Matrix, check_bounds};
use crate::error::{MatrixError, Result};
use crate::matrix::DenseMatrix;
use crate::parallel::BlockEngine;

type Line<T> = BTreeMap<usize, T>;

/// Nonzero entries of a `rows × cols` matrix, indexed both by row and by column.
///
/// A cell is stored in `row_index` iff it is stored in `col_index` iff its
/// value is nonzero. Rows and columns without entries have no inner map.
///
/// Mutation goes through `&mut self`, so concurrent `set` calls are ruled
/// out; callers sharing a matrix across threads must serialise writes.
#[derive(Debug, Clone)]
pub struct SparseMatrix<T> {
    rows: usize,
    cols: usize,
    row_index: BTreeMap<usize, Line<T>>,
    col_index: BTreeMap<usize, Line<T>>,
    par: Parallelism,
}

impl<T: Scalar> SparseMatrix<T> {
    /// Empty (all-zero) matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_index: BTreeMap::new(),
            col_index: BTreeMap::new(),
            par: Parallelism::default(),
        }
    }

    /// Build from `(row, col, value)` triplets; later triplets overwrite earlier ones.
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, T)>,
    {
        let mut m = Self::new(rows, cols);
        for (i, j, v) in triplets {
            m.set(i, j, v)?;
        }
        Ok(m)
    }

    pub fn with_parallelism(mut self, par: Parallelism) -> Self {
        self.par = par;
        self
    }

    /// Number of stored nonzeros.
    pub fn nnz(&self) -> usize {
        self.row_index.values().map(|line| line.len()).sum()
    }

    /// Stored entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.row_index
            .iter()
            .flat_map(|(&i, line)| line.iter().map(move |(&j, &v)| (i, j, v)))
    }

    /// Nonzeros of row `row`, keyed by column.
    pub fn row_map(&self, row: usize) -> Option<&BTreeMap<usize, T>> {
        self.row_index.get(&row)
    }

    /// Nonzeros of column `col`, keyed by row.
    pub fn col_map(&self, col: usize) -> Option<&BTreeMap<usize, T>> {
        self.col_index.get(&col)
    }

    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut dense = DenseMatrix::zeros(self.rows, self.cols).with_parallelism(self.par);
        for (i, j, v) in self.iter() {
            dense[(i, j)] = v;
        }
        dense
    }

    /// Store a nonzero in both indices; the caller guarantees range and nonzero value.
    pub(crate) fn insert(&mut self, row: usize, col: usize, value: T) {
        self.row_index.entry(row).or_default().insert(col, value);
        self.col_index.entry(col).or_default().insert(row, value);
    }

    fn remove(&mut self, row: usize, col: usize) {
        if let Some(line) = self.row_index.get_mut(&row) {
            line.remove(&col);
            if line.is_empty() {
                self.row_index.remove(&row);
            }
        }
        if let Some(line) = self.col_index.get_mut(&col) {
            line.remove(&row);
            if line.is_empty() {
                self.col_index.remove(&col);
            }
        }
    }
}

impl<T: Scalar> PartialEq for SparseMatrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.row_index == other.row_index
    }
}

impl<T: Scalar> Matrix<T> for SparseMatrix<T> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn value(&self, row: usize, col: usize) -> T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        self.row_index
            .get(&row)
            .and_then(|line| line.get(&col))
            .copied()
            .unwrap_or_else(T::zero)
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        check_bounds(self.shape(), row, col)?;
        if value.is_zero() {
            self.remove(row, col);
        } else {
            self.insert(row, col, value);
        }
        Ok(())
    }

    fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        self.row_index
            .get(&row)
            .into_iter()
            .flat_map(|line| line.iter().map(|(&j, &v)| (j, v)))
    }

    fn col_entries(&self, col: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        self.col_index
            .get(&col)
            .into_iter()
            .flat_map(|line| line.iter().map(|(&i, &v)| (i, v)))
    }

    fn parallelism(&self) -> Parallelism {
        self.par
    }

    fn parallelism_mut(&mut self) -> &mut Parallelism {
        &mut self.par
    }

    fn add_scalar_with(&self, _a: T, _par: Parallelism) -> Result<DenseMatrix<T>> {
        Err(MatrixError::UnsupportedOperation("add_scalar on sparse matrix"))
    }

    fn add_with<M: Matrix<T>>(&self, _other: &M, _par: Parallelism) -> Result<DenseMatrix<T>> {
        Err(MatrixError::UnsupportedOperation("add on sparse matrix"))
    }

    fn scale_with(&self, _a: T, _par: Parallelism) -> Result<DenseMatrix<T>> {
        Err(MatrixError::UnsupportedOperation("scale on sparse matrix"))
    }

    /// Dense product, summing only over the stored entries of each row of `self`.
    fn multiply_with<M: Matrix<T>>(&self, other: &M, par: Parallelism) -> Result<DenseMatrix<T>> {
        if self.cols != other.rows() {
            return Err(MatrixError::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let product = BlockEngine::new(par).map(self.rows, other.cols(), |i, j| {
            self.row_entries(i)
                .fold(T::zero(), |acc, (c, v)| acc + v * other.value(c, j))
        });
        Ok(product.with_parallelism(self.par))
    }

    /// Sequential: cost is proportional to the number of nonzeros.
    fn transpose_with(&self, _par: Parallelism) -> Self {
        let mut t = SparseMatrix::new(self.cols, self.rows).with_parallelism(self.par);
        for (i, j, v) in self.iter() {
            t.insert(j, i, v);
        }
        t
    }

    fn inverse_with(&self, _par: Parallelism) -> Result<DenseMatrix<T>> {
        Err(MatrixError::UnsupportedOperation("inverse on sparse matrix"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseMatrix<f64> {
        SparseMatrix::from_triplets(3, 4, vec![(0, 1, 2.0), (1, 1, 5.0), (2, 3, -1.0)]).unwrap()
    }

    #[test]
    fn get_defaults_to_zero() {
        let m = sample();
        assert_eq!(m.get(0, 1), Ok(2.0));
        assert_eq!(m.get(0, 0), Ok(0.0));
        assert_eq!(m.get(2, 2), Ok(0.0));
        assert!(m.get(3, 0).is_err());
    }

    #[test]
    fn zero_write_removes_from_both_indices() {
        let mut m = SparseMatrix::<f64>::new(3, 3);
        m.set(1, 1, 5.0).unwrap();
        assert_eq!(m.row_map(1).map(|r| r.len()), Some(1));
        assert_eq!(m.col_map(1).map(|c| c.len()), Some(1));
        m.set(1, 1, 0.0).unwrap();
        assert_eq!(m.get(1, 1), Ok(0.0));
        assert!(m.row_map(1).is_none());
        assert!(m.col_map(1).is_none());
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn zero_write_keeps_other_entries_in_line() {
        let mut m = sample();
        m.set(0, 3, 7.0).unwrap();
        m.set(0, 1, 0.0).unwrap();
        assert_eq!(m.row_map(0).map(|r| r.keys().copied().collect::<Vec<_>>()), Some(vec![3]));
        assert_eq!(m.col_map(1).map(|c| c.keys().copied().collect::<Vec<_>>()), Some(vec![1]));
        assert_eq!(m.col_map(3).map(|c| c.len()), Some(2));
    }

    #[test]
    fn set_out_of_bounds_fails() {
        let mut m = sample();
        assert_eq!(
            m.set(0, 4, 1.0),
            Err(MatrixError::IndexOutOfBounds { row: 0, col: 4, rows: 3, cols: 4 })
        );
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn entries_views_are_sorted() {
        let m = sample();
        assert_eq!(m.col_entries(1).collect::<Vec<_>>(), vec![(0, 2.0), (1, 5.0)]);
        assert_eq!(m.row_entries(2).collect::<Vec<_>>(), vec![(3, -1.0)]);
        assert_eq!(m.row_entries(0).count(), 1);
        assert_eq!(m.col_entries(0).count(), 0);
    }

    #[test]
    fn transpose_reinserts_entries() {
        let m = sample();
        let t = m.transpose();
        assert_eq!(t.shape(), (4, 3));
        assert_eq!(t.iter().collect::<Vec<_>>(), vec![(1, 0, 2.0), (1, 1, 5.0), (3, 2, -1.0)]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn multiply_returns_dense() {
        let m = sample();
        let p = m.multiply(&m.transpose()).unwrap();
        assert_eq!(p.shape(), (3, 3));
        assert_eq!(p.as_slice(), &[4.0, 10.0, 0.0, 10.0, 25.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(m.multiply(&m).is_err());
    }

    #[test]
    fn elementwise_ops_are_unsupported() {
        let m = sample();
        assert!(matches!(m.add_scalar(1.0), Err(MatrixError::UnsupportedOperation(_))));
        assert!(matches!(m.scale(2.0), Err(MatrixError::UnsupportedOperation(_))));
        assert!(matches!(m.add(&m), Err(MatrixError::UnsupportedOperation(_))));
        assert!(matches!(m.inverse(), Err(MatrixError::UnsupportedOperation(_))));
    }

    #[test]
    fn to_dense_materialises_entries() {
        let d = sample().to_dense();
        assert_eq!(d[(1, 1)], 5.0);
        assert_eq!(d[(2, 3)], -1.0);
        assert_eq!(d.as_slice().iter().filter(|v| **v != 0.0).count(), 3);
    }
}
