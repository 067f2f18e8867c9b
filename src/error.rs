//! Error taxonomy for compression and multiplication

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors reported by the compression codec and the multiplication engine.
///
/// Every variant except [`Error::Communication`] is local to one operation
/// and recoverable by the caller (retry with adjusted inputs). A
/// communication failure leaves the cooperating process group in an
/// undefined state and must terminate the run.
#[derive(Debug, Error)]
pub enum Error {
    /// An allocation returned no memory. All partially built structures
    /// for the failing operation are dropped; no partial object escapes.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// `A.num_cols != B.num_rows`. Reported before any allocation.
    #[error("incompatible dimensions: A is {a_rows}x{a_cols}, B is {b_rows}x{b_cols}")]
    DimensionMismatch {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },

    /// A row buffer would have to double past the addressable entry limit.
    /// The compressor keeps the entries captured before the overflow and
    /// records the row as truncated.
    #[error("row buffer cannot grow past {limit} entries")]
    CapacityOverflow { limit: usize },

    /// A send, receive, or collective leg failed. Fatal to the whole
    /// group: there is no retry and no partial recovery.
    #[error("communication failed: {0}")]
    Communication(String),

    /// A stored column index addresses a row outside the right-hand
    /// matrix during multiplication.
    #[error("row {row} references column {col} outside the right-hand matrix's rows")]
    ReferentialViolation { row: usize, col: usize },

    /// The shared-memory strategy could not build its worker pool.
    #[error("worker pool construction failed: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
