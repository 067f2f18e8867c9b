//! Compression of dense matrices into the row-compressed format
//!
//! Rows are independent of one another, so the scan runs across the rayon
//! pool with each worker writing only its own row's slot. The density hint
//! presizes the per-row buffer; it is never enforced. A row whose buffer
//! would have to double past the configured entry limit is truncated in
//! place and reported through [`CompressedMatrix::truncated_rows`].

pub mod distributed;

use rayon::prelude::*;
use tracing::warn;

use crate::error::Error;
use crate::matrix::{CompressedMatrix, DenseMatrix, Entry};

/// Ceiling on stored entries per row, bounded by addressable memory.
pub const MAX_ROW_ENTRIES: usize = isize::MAX as usize / std::mem::size_of::<Entry>();

/// Tuning knobs for compression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressConfig {
    /// Expected nonzero fraction, used only to presize row buffers.
    pub density_hint: f32,

    /// Maximum entries one row buffer may grow to. Doubling past this
    /// limit truncates the row instead of corrupting memory.
    pub row_capacity_limit: usize,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            density_hint: 0.05,
            row_capacity_limit: MAX_ROW_ENTRIES,
        }
    }
}

/// Growable buffer for one row's `(column, value)` entries.
///
/// Capacity doubles amortized, with every growth going through
/// `try_reserve` so allocation failure surfaces as [`Error::Allocation`]
/// instead of aborting, and with an explicit ceiling that surfaces as
/// [`Error::CapacityOverflow`].
pub(crate) struct RowBuilder {
    entries: Vec<Entry>,
    limit: usize,
}

impl RowBuilder {
    /// Presizes for `cols * density_hint + 1` entries.
    pub(crate) fn with_hint(cols: usize, density_hint: f32, limit: usize) -> Result<Self, Error> {
        let initial = (cols as f32 * density_hint) as usize + 1;
        let mut entries = Vec::new();
        entries.try_reserve_exact(initial.min(limit))?;
        Ok(Self { entries, limit })
    }

    /// Appends one entry, doubling capacity when full.
    pub(crate) fn push(&mut self, col: usize, val: i32) -> Result<(), Error> {
        if self.entries.len() == self.entries.capacity() {
            let current = self.entries.capacity().max(1);
            let doubled = current
                .checked_mul(2)
                .filter(|&c| c <= self.limit)
                .ok_or(Error::CapacityOverflow { limit: self.limit })?;
            self.entries.try_reserve_exact(doubled - self.entries.len())?;
        }
        self.entries.push((col, val));
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Seals the row: empty rows get the two-entry zero sentinel, and the
    /// buffer is trimmed to its exact final count.
    pub(crate) fn finish(mut self) -> Result<Vec<Entry>, Error> {
        if self.entries.is_empty() {
            self.entries.try_reserve_exact(2)?;
            self.entries.push((0, 0));
            self.entries.push((0, 0));
        }
        self.entries.shrink_to_fit();
        Ok(self.entries)
    }
}

/// Compresses a dense matrix with the default configuration and the given
/// density hint.
pub fn compress_with_density(dense: &DenseMatrix, density_hint: f32) -> Result<CompressedMatrix, Error> {
    compress(
        dense,
        &CompressConfig {
            density_hint,
            ..CompressConfig::default()
        },
    )
}

/// Compresses a dense matrix into the row-compressed format.
///
/// Allocation failure aborts the whole construction and drops every
/// partially built row. Capacity overflow truncates only the affected row;
/// the matrix is still returned and the loss is observable through
/// [`CompressedMatrix::truncated_rows`].
pub fn compress(dense: &DenseMatrix, config: &CompressConfig) -> Result<CompressedMatrix, Error> {
    let per_row: Vec<(Vec<Entry>, bool)> = (0..dense.rows())
        .into_par_iter()
        .map(|i| compress_row(i, dense.row(i), config))
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    rows.try_reserve_exact(per_row.len())?;
    let mut truncated_rows = Vec::new();
    for (i, (entries, truncated)) in per_row.into_iter().enumerate() {
        if truncated {
            truncated_rows.push(i);
        }
        rows.push(entries);
    }

    Ok(CompressedMatrix::from_parts(
        dense.rows(),
        dense.cols(),
        rows,
        truncated_rows,
    ))
}

fn compress_row(i: usize, row: &[i32], config: &CompressConfig) -> Result<(Vec<Entry>, bool), Error> {
    let mut builder = RowBuilder::with_hint(row.len(), config.density_hint, config.row_capacity_limit)?;
    let mut truncated = false;

    for (j, &val) in row.iter().enumerate() {
        if val == 0 {
            continue;
        }
        match builder.push(j, val) {
            Ok(()) => {}
            Err(Error::CapacityOverflow { limit }) => {
                warn!(row = i, limit, kept = builder.len(), "row buffer overflow, truncating row");
                truncated = true;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok((builder.finish()?, truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_builder_doubles_to_limit() {
        let mut builder = RowBuilder::with_hint(10, 0.0, 4).unwrap();
        // initial capacity is 1; doubles to 2, then 4
        for k in 0..4 {
            builder.push(k, 1).unwrap();
        }
        let err = builder.push(4, 1).unwrap_err();
        assert!(matches!(err, Error::CapacityOverflow { limit: 4 }));
    }

    #[test]
    fn test_row_builder_sentinel() {
        let builder = RowBuilder::with_hint(8, 0.5, MAX_ROW_ENTRIES).unwrap();
        let entries = builder.finish().unwrap();
        assert_eq!(entries, vec![(0, 0), (0, 0)]);
    }

    #[test]
    fn test_compress_basic() {
        let dense = DenseMatrix::from_rows(vec![vec![0, 5, 0, -2], vec![0, 0, 0, 0]]);
        let compressed = compress_with_density(&dense, 0.5).unwrap();

        assert_eq!(compressed.num_rows, 2);
        assert_eq!(compressed.num_cols, 4);
        assert_eq!(compressed.row(0), &[(1, 5), (3, -2)]);
        assert_eq!(compressed.row(1), &[(0, 0), (0, 0)]);
        assert!(compressed.is_lossless());
    }

    #[test]
    fn test_density_hint_not_enforced() {
        // Hint of zero still captures every nonzero cell.
        let dense = DenseMatrix::from_rows(vec![vec![1, 2, 3, 4, 5]]);
        let compressed = compress_with_density(&dense, 0.0).unwrap();
        assert_eq!(compressed.row_len(0), 5);
    }

    #[test]
    fn test_truncation_keeps_prefix() {
        let dense = DenseMatrix::from_rows(vec![vec![1, 2, 3, 4, 5, 6], vec![7, 0, 0, 0, 0, 0]]);
        let config = CompressConfig {
            density_hint: 0.0,
            row_capacity_limit: 2,
        };
        let compressed = compress(&dense, &config).unwrap();

        assert!(!compressed.is_lossless());
        assert_eq!(compressed.truncated_rows(), &[0]);
        assert_eq!(compressed.row(0), &[(0, 1), (1, 2)]);
        // Row below the limit is untouched.
        assert_eq!(compressed.row(1), &[(0, 7)]);
    }

    #[test]
    fn test_full_density_round_trip() {
        let dense = DenseMatrix::from_rows(vec![
            vec![1, -2, 3],
            vec![4, 5, -6],
            vec![-7, 8, 9],
        ]);
        let compressed = compress_with_density(&dense, 1.0).unwrap();
        assert_eq!(compressed.to_dense(), dense);
    }
}
