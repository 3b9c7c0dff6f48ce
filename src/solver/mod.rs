//! Triangular solvers and the SPD inverse built from them.

use log::debug;

use crate::config::Parallelism;
use crate::core::traits::check_square;
use crate::core::{Matrix, Scalar};
use crate::error::Result;
use crate::matrix::DenseMatrix;

pub mod cholesky;
pub use cholesky::cholesky;

pub mod triangular;
pub use triangular::invert_lower;

/// Inverse of a symmetric positive-definite matrix.
///
/// With `M = L Lᵀ`, `M⁻¹ = L⁻ᵀ L⁻¹`: decompose, invert the factor, then one
/// block-parallel transpose and multiply.
pub fn spd_inverse<T, M>(m: &M, par: Parallelism) -> Result<DenseMatrix<T>>
where
    T: Scalar,
    M: Matrix<T>,
{
    let n = check_square(m.shape())?;
    debug!("spd inverse: {n}x{n}, {par:?}");
    let l = cholesky(m, par)?;
    let l_inv = invert_lower(&l, par)?;
    l_inv.transpose_with(par).multiply_with(&l_inv, par)
}
