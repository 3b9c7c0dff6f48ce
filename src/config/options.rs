//! Worker-count and blocksize options for block-parallel operations.
//!
//! Every matrix carries a `Parallelism` that is read at the start of each
//! operation. The `*_with` variants of the matrix operations take an explicit
//! `Parallelism` instead.

#[cfg(feature = "rayon")]
use std::sync::OnceLock;

/// Default edge length of a square block.
pub const DEFAULT_BLOCKSIZE: usize = 64;

/// Worker count and blocksize used to partition and execute an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parallelism {
    /// Number of workers claiming blocks (0 is treated as 1)
    pub workers: usize,

    /// Edge length of a block (0 is treated as 1)
    pub blocksize: usize,
}

impl Parallelism {
    pub fn new(workers: usize, blocksize: usize) -> Self {
        Self { workers, blocksize }
    }

    /// One worker: blocks are processed in a fixed order on a single thread.
    pub fn sequential() -> Self {
        Self::default().with_workers(1)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_blocksize(mut self, blocksize: usize) -> Self {
        self.blocksize = blocksize;
        self
    }

    pub(crate) fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }

    pub(crate) fn effective_blocksize(&self) -> usize {
        self.blocksize.max(1)
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        #[cfg(feature = "rayon")]
        let workers = {
            static CPUS: OnceLock<usize> = OnceLock::new();
            *CPUS.get_or_init(num_cpus::get)
        };
        #[cfg(not(feature = "rayon"))]
        let workers = 1;
        Self {
            workers,
            blocksize: DEFAULT_BLOCKSIZE,
        }
    }
}
