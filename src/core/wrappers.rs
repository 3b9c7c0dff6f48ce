//! Conversions between `DenseMatrix` and faer dense matrices.
//!
//! These let callers hand results to faer (or build inputs with it) and give
//! the test-suite an independent reference implementation.

use faer::Mat;

use crate::matrix::DenseMatrix;

impl From<&Mat<f64>> for DenseMatrix<f64> {
    fn from(m: &Mat<f64>) -> Self {
        DenseMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
    }
}

impl From<&DenseMatrix<f64>> for Mat<f64> {
    fn from(m: &DenseMatrix<f64>) -> Self {
        Mat::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
    }
}
