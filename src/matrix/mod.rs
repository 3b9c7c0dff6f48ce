//! Matrix module: dense and sparse representations and construction helpers.

pub mod dense;
pub use dense::DenseMatrix;
pub mod sparse;
pub use sparse::SparseMatrix;
pub mod factory;
pub use factory::{identity, random, random_seeded, sparse_identity};
