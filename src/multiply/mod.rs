//! Multiplication of compressed matrices into a dense product
//!
//! One row-wise accumulation kernel serves three interchangeable
//! execution strategies: single control flow, a fork-join worker pool
//! over shared memory, and a synchronous process group. The final dense
//! content is independent of how rows are assigned to workers or
//! processes; only wall-clock behavior differs.

pub(crate) mod distributed;
pub(crate) mod kernel;
pub(crate) mod shared;

use crate::comm::Communicator;
use crate::error::Error;
use crate::matrix::{CompressedMatrix, DenseMatrix};
use crate::multiply::kernel::{accumulate_row, DirectSink};

/// Row-to-worker assignment policy for the shared-memory strategy.
///
/// Affects scheduling only; every policy produces the identical product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// Contiguous row blocks, one per worker.
    Static,
    /// Work-stealing with single-row granularity.
    Dynamic,
    /// Work-stealing with larger minimum chunks.
    Guided,
    /// Leave chunking to the runtime.
    #[default]
    Auto,
}

/// How distributed partial results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Elementwise sum-reduction followed by a broadcast; every rank
    /// receives the complete product.
    AllReduce,
    /// Each non-root rank sends its owned row block to the root, which
    /// assembles the full product alone.
    Gather,
}

/// Execution strategy for one multiply call.
#[derive(Clone, Copy)]
pub enum Strategy<'a> {
    /// One row after another, deterministic accumulation order.
    Sequential,

    /// Fork-join worker pool for the duration of the call. `workers == 0`
    /// means one worker per available CPU.
    SharedMemory { workers: usize, schedule: Schedule },

    /// Synchronous collective over an established process group. Every
    /// participant must call [`multiply`] together with the same operand
    /// shapes and strategy, or the group deadlocks.
    Distributed {
        comm: &'a dyn Communicator,
        combine: Combine,
        root: usize,
    },
}

/// Multiplies two compressed matrices into a dense product.
///
/// Requires `a.num_cols == b.num_rows`; a mismatch fails with
/// [`Error::DimensionMismatch`] before anything is allocated.
///
/// Returns `Ok(None)` only for [`Strategy::Distributed`] with
/// [`Combine::Gather`] on non-root ranks, where the full product exists at
/// the root alone; every other successful path yields `Ok(Some(_))`.
pub fn multiply(
    a: &CompressedMatrix,
    b: &CompressedMatrix,
    strategy: Strategy<'_>,
) -> Result<Option<DenseMatrix>, Error> {
    if a.num_cols != b.num_rows {
        return Err(Error::DimensionMismatch {
            a_rows: a.num_rows,
            a_cols: a.num_cols,
            b_rows: b.num_rows,
            b_cols: b.num_cols,
        });
    }

    match strategy {
        Strategy::Sequential => sequential(a, b).map(Some),
        Strategy::SharedMemory { workers, schedule } => {
            shared::multiply_shared(a, b, workers, schedule).map(Some)
        }
        Strategy::Distributed { comm, combine, root } => {
            distributed::multiply_distributed(a, b, comm, combine, root)
        }
    }
}

fn sequential(a: &CompressedMatrix, b: &CompressedMatrix) -> Result<DenseMatrix, Error> {
    let mut out = DenseMatrix::zeros(a.num_rows, b.num_cols);
    for i in 0..a.num_rows {
        let mut sink = DirectSink(out.row_mut(i));
        accumulate_row(i, a, b, &mut sink)?;
    }
    Ok(out)
}
