//! Row-wise sparse accumulation kernel (Gustavson's method)
//!
//! The multiply arithmetic is implemented once, parameterized by an
//! accumulation sink. Whole-row partitioning gives every output row a
//! single owner, so the direct sink suffices for every strategy specified
//! today; the atomic sink keeps the kernel correct should a
//! finer-than-row partition ever be introduced.

use std::sync::atomic::{AtomicI32, Ordering};

use crate::error::Error;
use crate::matrix::CompressedMatrix;

/// Destination for one output row's accumulated products, indexed by
/// column of the result.
pub(crate) trait RowSink {
    fn add(&mut self, col: usize, val: i32);
}

/// Plain `+=` into an exclusively owned row slice.
pub(crate) struct DirectSink<'a>(pub &'a mut [i32]);

impl RowSink for DirectSink<'_> {
    fn add(&mut self, col: usize, val: i32) {
        self.0[col] += val;
    }
}

/// Atomic add into a shared row slice.
pub(crate) struct AtomicSink<'a>(pub &'a [AtomicI32]);

impl RowSink for AtomicSink<'_> {
    fn add(&mut self, col: usize, val: i32) {
        self.0[col].fetch_add(val, Ordering::Relaxed);
    }
}

/// Accumulates row `i` of `a * b` into `sink`.
///
/// For each stored `(a_col, a_val)` of A's row `i`, walks row `a_col` of B
/// and adds `a_val * b_val` at each of its columns. Zero-valued entries
/// (the empty-row sentinel) reference no data and are skipped; a nonzero
/// entry whose column is not a valid row of B is a referential violation
/// and aborts the operation.
pub(crate) fn accumulate_row<S: RowSink>(
    i: usize,
    a: &CompressedMatrix,
    b: &CompressedMatrix,
    sink: &mut S,
) -> Result<(), Error> {
    for &(a_col, a_val) in a.row(i) {
        if a_val == 0 {
            continue;
        }
        if a_col >= b.num_rows {
            return Err(Error::ReferentialViolation { row: i, col: a_col });
        }
        for &(b_col, b_val) in b.row(a_col) {
            sink.add(b_col, a_val * b_val);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_sink_accumulates() {
        let a = CompressedMatrix::from_rows(1, 2, vec![vec![(0, 2), (1, 3)]]);
        let b = CompressedMatrix::from_rows(2, 2, vec![vec![(0, 1), (1, 4)], vec![(0, 5)]]);

        let mut out = vec![0, 0];
        accumulate_row(0, &a, &b, &mut DirectSink(&mut out)).unwrap();
        // 2*[1,4] + 3*[5,0]
        assert_eq!(out, vec![17, 8]);
    }

    #[test]
    fn test_atomic_sink_matches_direct() {
        let a = CompressedMatrix::from_rows(1, 3, vec![vec![(0, 1), (2, -2)]]);
        let b = CompressedMatrix::from_rows(
            3,
            2,
            vec![vec![(1, 6)], vec![(0, 9)], vec![(0, 3), (1, 3)]],
        );

        let mut direct = vec![0, 0];
        accumulate_row(0, &a, &b, &mut DirectSink(&mut direct)).unwrap();

        let atomic: Vec<AtomicI32> = (0..2).map(|_| AtomicI32::new(0)).collect();
        accumulate_row(0, &a, &b, &mut AtomicSink(&atomic)).unwrap();
        let atomic: Vec<i32> = atomic.into_iter().map(AtomicI32::into_inner).collect();

        assert_eq!(direct, atomic);
    }

    #[test]
    fn test_sentinel_entries_are_inert() {
        // Row of A is all zeros, stored as the two-entry sentinel.
        let a = CompressedMatrix::from_rows(1, 2, vec![vec![]]);
        let b = CompressedMatrix::from_rows(2, 2, vec![vec![(0, 7)], vec![(1, 8)]]);

        let mut out = vec![0, 0];
        accumulate_row(0, &a, &b, &mut DirectSink(&mut out)).unwrap();
        assert_eq!(out, vec![0, 0]);
    }

    #[test]
    fn test_referential_violation_rejected() {
        let a = CompressedMatrix::from_rows_unchecked(1, 2, vec![vec![(5, 1)]]);
        let b = CompressedMatrix::from_rows(2, 2, vec![vec![(0, 1)], vec![(1, 1)]]);

        let mut out = vec![0, 0];
        let err = accumulate_row(0, &a, &b, &mut DirectSink(&mut out)).unwrap_err();
        assert!(matches!(err, Error::ReferentialViolation { row: 0, col: 5 }));
    }
}
