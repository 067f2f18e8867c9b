//! Shared-memory parallel strategy
//!
//! The outer row loop is partitioned across a rayon pool built for the
//! duration of one multiply call: workers fork at entry and are joined
//! before the function returns. Every output row is written by exactly one
//! worker, but accumulation still goes through the atomic sink so the
//! kernel stays correct under finer partitions. The schedule changes only
//! wall-clock behavior, never the numeric result.

use std::sync::atomic::AtomicI32;

use rayon::prelude::*;

use crate::comm::block_partition;
use crate::error::Error;
use crate::matrix::{CompressedMatrix, DenseMatrix};
use crate::multiply::kernel::{accumulate_row, AtomicSink};
use crate::multiply::Schedule;

pub(crate) fn multiply_shared(
    a: &CompressedMatrix,
    b: &CompressedMatrix,
    workers: usize,
    schedule: Schedule,
) -> Result<DenseMatrix, Error> {
    let workers = if workers == 0 { num_cpus::get() } else { workers };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;

    let n_rows = a.num_rows;
    let n_cols = b.num_cols;

    let mut cells = Vec::new();
    cells.try_reserve_exact(n_rows * n_cols)?;
    cells.extend((0..n_rows * n_cols).map(|_| AtomicI32::new(0)));

    {
        let cells = &cells[..];
        let compute_row = |i: usize| -> Result<(), Error> {
            let mut sink = AtomicSink(&cells[i * n_cols..(i + 1) * n_cols]);
            accumulate_row(i, a, b, &mut sink)
        };

        pool.install(|| match schedule {
            Schedule::Static => block_partition(n_rows, workers)
                .into_par_iter()
                .try_for_each(|range| range.into_iter().try_for_each(&compute_row)),
            Schedule::Dynamic => (0..n_rows)
                .into_par_iter()
                .with_min_len(1)
                .try_for_each(&compute_row),
            Schedule::Guided => (0..n_rows)
                .into_par_iter()
                .with_min_len((n_rows / (workers * 4)).max(1))
                .try_for_each(&compute_row),
            Schedule::Auto => (0..n_rows).into_par_iter().try_for_each(&compute_row),
        })?;
    }

    let data: Vec<i32> = cells.into_iter().map(AtomicI32::into_inner).collect();
    Ok(DenseMatrix::from_flat(n_rows, n_cols, data))
}
