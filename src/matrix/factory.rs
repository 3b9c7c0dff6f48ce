//! Construction helpers for common matrices.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Parallelism;
use crate::core::Scalar;
use crate::matrix::{DenseMatrix, SparseMatrix};
use crate::parallel::BlockEngine;

/// Dense `n × n` identity.
pub fn identity<T: Scalar>(n: usize) -> DenseMatrix<T> {
    let mut m = DenseMatrix::zeros(n, n);
    for i in 0..n {
        m[(i, i)] = T::one();
    }
    m
}

/// Sparse `n × n` identity.
pub fn sparse_identity<T: Scalar>(n: usize) -> SparseMatrix<T> {
    let mut m = SparseMatrix::new(n, n);
    for i in 0..n {
        m.insert(i, i, T::one());
    }
    m
}

/// `rows × cols` matrix of uniform values in `[0, upper)`, filled block-parallel.
///
/// Each worker draws from its thread-local generator, so the result is not
/// reproducible; see [`random_seeded`].
pub fn random<T: Scalar>(rows: usize, cols: usize, upper: f64, par: Parallelism) -> DenseMatrix<T> {
    BlockEngine::new(par).map(rows, cols, |_, _| {
        let x: f64 = rand::thread_rng().r#gen();
        T::from_f64(x * upper).unwrap_or_else(T::zero)
    })
}

/// Reproducible variant of [`random`], filled sequentially from `seed`.
pub fn random_seeded<T: Scalar>(rows: usize, cols: usize, upper: f64, seed: u64) -> DenseMatrix<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    DenseMatrix::from_fn(rows, cols, |_, _| {
        let x: f64 = rng.r#gen();
        T::from_f64(x * upper).unwrap_or_else(T::zero)
    })
}
