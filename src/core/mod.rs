//! Core matrix capability contract and faer interop.

pub mod traits;
pub mod wrappers;

pub use traits::{Matrix, Scalar};
