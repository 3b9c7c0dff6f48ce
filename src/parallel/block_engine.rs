//! Block engine: runs a per-cell function over a partitioned index space.
//!
//! The `rows × cols` space is cut into `blocksize × blocksize` rectangles
//! (smaller at the right and bottom edges). Workers take blocks by
//! fetch-and-decrement on a shared counter, so each block is processed by
//! exactly one worker and no two workers ever touch the same cell.

use std::ops::Range;
#[cfg(feature = "rayon")]
use std::sync::Mutex;
use std::sync::atomic::{AtomicIsize, Ordering};

use log::debug;

use crate::config::Parallelism;
use crate::core::Scalar;
use crate::matrix::DenseMatrix;

/// Half-open rectangle `[row_start, row_end) × [col_start, col_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Block {
    pub fn rows(&self) -> Range<usize> {
        self.row_start..self.row_end
    }

    pub fn cols(&self) -> Range<usize> {
        self.col_start..self.col_end
    }

    /// Number of cells in the block.
    pub fn len(&self) -> usize {
        self.rows().len() * self.cols().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.cols();
        self.rows().flat_map(move |i| cols.clone().map(move |j| (i, j)))
    }
}

/// Split `rows × cols` into row-major blocks of edge `blocksize`.
///
/// Yields `ceil(rows/b) * ceil(cols/b)` disjoint blocks covering every
/// coordinate once. A blocksize of 0 is treated as 1.
pub fn partition(rows: usize, cols: usize, blocksize: usize) -> Vec<Block> {
    let b = blocksize.max(1);
    let mut blocks = Vec::with_capacity(rows.div_ceil(b) * cols.div_ceil(b));
    for row_start in (0..rows).step_by(b) {
        for col_start in (0..cols).step_by(b) {
            blocks.push(Block {
                row_start,
                row_end: (row_start + b).min(rows),
                col_start,
                col_end: (col_start + b).min(cols),
            });
        }
    }
    blocks
}

/// Distribute `items` work items over `workers` workers and wait for all of them.
///
/// Each worker repeatedly fetch-and-decrements a counter initialised to
/// `items`; a returned value `v > 0` hands it item `v - 1`. A worker keeps its
/// own accumulator `S`, and the accumulators of all workers are returned once
/// every worker has exited.
pub fn claim<S, F>(items: usize, workers: usize, work: F) -> Vec<S>
where
    S: Default + Send,
    F: Fn(usize, &mut S) + Sync,
{
    let workers = workers.max(1);
    let counter = AtomicIsize::new(items as isize);
    let worker = || {
        let mut local = S::default();
        loop {
            let claimed = counter.fetch_sub(1, Ordering::AcqRel);
            if claimed <= 0 {
                break;
            }
            work((claimed - 1) as usize, &mut local);
        }
        local
    };

    #[cfg(feature = "rayon")]
    {
        if workers == 1 {
            return vec![worker()];
        }
        let finished = Mutex::new(Vec::with_capacity(workers));
        rayon::scope(|s| {
            for _ in 0..workers {
                s.spawn(|_| {
                    let local = worker();
                    finished
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push(local);
                });
            }
        });
        finished
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
    #[cfg(not(feature = "rayon"))]
    {
        (0..workers).map(|_| worker()).collect()
    }
}

/// Executes per-cell functions over block partitions with fixed options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockEngine {
    par: Parallelism,
}

impl BlockEngine {
    pub fn new(par: Parallelism) -> Self {
        Self { par }
    }

    pub fn parallelism(&self) -> Parallelism {
        self.par
    }

    /// Block descriptors for a `rows × cols` space at this engine's blocksize.
    pub fn blocks(&self, rows: usize, cols: usize) -> Vec<Block> {
        partition(rows, cols, self.par.effective_blocksize())
    }

    /// Invoke `f(row, col)` exactly once for every coordinate.
    ///
    /// `f` must confine its writes to the cell it is given; reads of fully
    /// built matrices are unrestricted.
    pub fn run<F>(&self, rows: usize, cols: usize, f: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        let blocks = self.blocks(rows, cols);
        debug!(
            "block engine: run {rows}x{cols}, {} blocks, {} workers",
            blocks.len(),
            self.par.effective_workers()
        );
        claim(blocks.len(), self.par.effective_workers(), |idx, _: &mut ()| {
            for (i, j) in blocks[idx].cells() {
                f(i, j);
            }
        });
    }

    /// Build a `rows × cols` matrix whose cell `(i, j)` is `f(i, j)`.
    ///
    /// Workers evaluate whole blocks into private buffers; the buffers are
    /// copied into the destination after the region completes.
    pub fn map<T, F>(&self, rows: usize, cols: usize, f: F) -> DenseMatrix<T>
    where
        T: Scalar,
        F: Fn(usize, usize) -> T + Sync,
    {
        let blocks = self.blocks(rows, cols);
        debug!(
            "block engine: map {rows}x{cols}, {} blocks, {} workers",
            blocks.len(),
            self.par.effective_workers()
        );
        let computed = claim(
            blocks.len(),
            self.par.effective_workers(),
            |idx, out: &mut Vec<(Block, Vec<T>)>| {
                let block = blocks[idx];
                let values = block.cells().map(|(i, j)| f(i, j)).collect();
                out.push((block, values));
            },
        );

        let mut dst = DenseMatrix::zeros(rows, cols).with_parallelism(self.par);
        // workers never share the destination; blocks are copied in serially after the barrier
        for (block, values) in computed.into_iter().flatten() {
            for ((i, j), v) in block.cells().zip(values) {
                dst[(i, j)] = v;
            }
        }
        dst
    }
}
