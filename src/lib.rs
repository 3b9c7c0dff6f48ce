//! blockmat: block-parallel dense and sparse matrices
//!
//! This crate provides the linear-algebra substrate of an alternating least squares
//! factorization: a common matrix contract, dense and dual-indexed sparse storage,
//! a block-partitioned parallel engine, wavefront Cholesky decomposition, and
//! inversion of symmetric positive-definite matrices.

pub mod parallel;

pub mod config;
pub mod core;
pub mod error;
pub mod matrix;
pub mod solver;

// Re-exports for convenience
pub use crate::config::{DEFAULT_BLOCKSIZE, Parallelism};
pub use crate::core::{Matrix, Scalar};
pub use crate::error::MatrixError;
pub use crate::matrix::{DenseMatrix, SparseMatrix, identity, random, random_seeded, sparse_identity};
pub use crate::parallel::{Block, BlockEngine};
pub use crate::solver::{cholesky, invert_lower, spd_inverse};
