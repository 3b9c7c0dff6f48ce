//! Block-partitioned parallel execution.
//!
//! Work is split into items (blocks, Cholesky cells, triangular columns) that
//! workers claim from a single atomic counter. Every parallel region returns
//! only after all of its workers have finished.

pub mod block_engine;
pub use block_engine::{Block, BlockEngine, claim, partition};
