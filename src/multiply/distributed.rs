//! Distributed strategy
//!
//! Rows of A are partitioned across the process group with the same
//! contiguous block scheme the distributed compressor uses. Each rank
//! computes its row slice into a full-width local buffer (non-owned rows
//! stay zero), then the partial results are combined either by an
//! elementwise all-reduce (every rank ends up with the full product) or by
//! a point-to-point gather of owned row blocks at the root. Both combines
//! are mathematically equivalent: row ownership is disjoint and addition
//! commutes.

use tracing::debug;

use crate::comm::{block_partition, Communicator};
use crate::error::Error;
use crate::matrix::{CompressedMatrix, DenseMatrix};
use crate::multiply::kernel::{accumulate_row, DirectSink};
use crate::multiply::Combine;

pub(crate) fn multiply_distributed(
    a: &CompressedMatrix,
    b: &CompressedMatrix,
    comm: &dyn Communicator,
    combine: Combine,
    root: usize,
) -> Result<Option<DenseMatrix>, Error> {
    let rank = comm.rank();
    let ranges = block_partition(a.num_rows, comm.size());
    let own = ranges[rank].clone();
    let n_cols = b.num_cols;

    let mut flat = Vec::new();
    flat.try_reserve_exact(a.num_rows * n_cols)?;
    flat.resize(a.num_rows * n_cols, 0);

    for i in own.clone() {
        let mut sink = DirectSink(&mut flat[i * n_cols..(i + 1) * n_cols]);
        accumulate_row(i, a, b, &mut sink)?;
    }
    debug!(rank, rows = own.len(), "computed owned row slice");

    match combine {
        Combine::AllReduce => {
            comm.allreduce_sum(root, &mut flat)?;
            Ok(Some(DenseMatrix::from_flat(a.num_rows, n_cols, flat)))
        }
        Combine::Gather => {
            if rank != root {
                comm.send(root, &flat[own.start * n_cols..own.end * n_cols])?;
                return Ok(None);
            }

            for (r, range) in ranges.iter().enumerate() {
                if r == root {
                    continue;
                }
                let block = comm.recv(r)?;
                if block.len() != range.len() * n_cols {
                    return Err(Error::Communication(format!(
                        "rank {} delivered {} elements, partition assigned {}",
                        r,
                        block.len(),
                        range.len() * n_cols
                    )));
                }
                flat[range.start * n_cols..range.end * n_cols].copy_from_slice(&block);
            }
            Ok(Some(DenseMatrix::from_flat(a.num_rows, n_cols, flat)))
        }
    }
}
