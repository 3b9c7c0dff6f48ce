//! Inverse of a lower-triangular matrix by column-wise forward substitution.

use log::debug;

use crate::config::Parallelism;
use crate::core::traits::check_square;
use crate::core::{Matrix, Scalar};
use crate::error::Result;
use crate::matrix::DenseMatrix;
use crate::parallel::claim;

/// `L⁻¹` for lower-triangular `L`.
///
/// Column `c` of the inverse solves `L x = e_c`; columns are independent and
/// are claimed by workers without any barrier between them. Entries above the
/// diagonal of `l` are ignored.
pub fn invert_lower<T, M>(l: &M, par: Parallelism) -> Result<DenseMatrix<T>>
where
    T: Scalar,
    M: Matrix<T>,
{
    let n = check_square(l.shape())?;
    let workers = par.effective_workers();
    debug!("invert lower: {n}x{n}, {workers} workers");

    let columns = claim(n, workers, |c, out: &mut Vec<(usize, Vec<T>)>| {
        out.push((c, forward_substitute(l, c)));
    });

    let mut inv = DenseMatrix::zeros(n, n).with_parallelism(par);
    for (c, x) in columns.into_iter().flatten() {
        for (i, v) in x.into_iter().enumerate() {
            inv[(i, c)] = v;
        }
    }
    Ok(inv)
}

/// Solve `L x = e_c`.
fn forward_substitute<T, M>(l: &M, c: usize) -> Vec<T>
where
    T: Scalar,
    M: Matrix<T>,
{
    let n = l.rows();
    let mut x = vec![T::zero(); n];
    // rows above c have a zero right-hand side and zero predecessors
    for i in c..n {
        let sum = l
            .row_entries(i)
            .take_while(|&(j, _)| j < i)
            .fold(T::zero(), |acc, (j, v)| acc + v * x[j]);
        let rhs = if i == c { T::one() } else { T::zero() };
        x[i] = quotient(rhs - sum, l.value(i, i));
    }
    x
}

/// `num / den`, with the indeterminate `0 / 0` taken as zero.
fn quotient<T: Scalar>(num: T, den: T) -> T {
    if num.is_zero() && den.is_zero() {
        T::zero()
    } else {
        num / den
    }
}
