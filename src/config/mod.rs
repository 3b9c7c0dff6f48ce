//! Parallel execution options shared by every matrix operation.

pub mod options;
pub use options::{DEFAULT_BLOCKSIZE, Parallelism};
