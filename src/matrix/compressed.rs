//! Row-compressed sparse matrix representation
//!
//! Each row stores its nonzero cells as an ordered sequence of
//! `(column, value)` pairs in scan order. A row with no nonzero cells is
//! represented by exactly two `(0, 0)` sentinel entries rather than an
//! empty sequence; decompression and multiplication both rely on that
//! convention staying stable.

use std::fmt;
use std::io::{self, Write};

use crate::matrix::DenseMatrix;

/// One stored entry: `(column index, value)`.
pub type Entry = (usize, i32);

/// A dense matrix compressed row by row into `(column, value)` pairs.
///
/// Immutable once built: the multiplier only reads it, and the owner
/// releases it by dropping. Entries within a row appear in left-to-right
/// scan order and need not be sorted by column.
#[derive(Clone, PartialEq, Eq)]
pub struct CompressedMatrix {
    /// Number of rows of the logical dense matrix.
    pub num_rows: usize,

    /// Number of columns of the logical dense matrix.
    pub num_cols: usize,

    rows: Vec<Vec<Entry>>,
    truncated_rows: Vec<usize>,
}

impl CompressedMatrix {
    /// Builds a compressed matrix from per-row entry sequences.
    ///
    /// Rows with zero entries are replaced by the two-entry zero sentinel.
    ///
    /// # Panics
    ///
    /// Panics if `rows.len() != num_rows` or any stored column index is
    /// `>= num_cols`.
    pub fn from_rows(num_rows: usize, num_cols: usize, mut rows: Vec<Vec<Entry>>) -> Self {
        assert_eq!(rows.len(), num_rows, "rows.len() must equal num_rows");
        for (i, row) in rows.iter_mut().enumerate() {
            for &(col, _) in row.iter() {
                assert!(col < num_cols, "row {}: column index {} out of bounds (num_cols = {})", i, col, num_cols);
            }
            if row.is_empty() {
                row.extend_from_slice(&[(0, 0), (0, 0)]);
            }
        }

        Self {
            num_rows,
            num_cols,
            rows,
            truncated_rows: Vec::new(),
        }
    }

    /// Builds a compressed matrix without validating column indices.
    ///
    /// The caller must guarantee every stored column index is within
    /// `num_cols`; the multiplier still rejects out-of-range row
    /// references it encounters.
    pub fn from_rows_unchecked(num_rows: usize, num_cols: usize, rows: Vec<Vec<Entry>>) -> Self {
        assert_eq!(rows.len(), num_rows, "rows.len() must equal num_rows");
        Self {
            num_rows,
            num_cols,
            rows,
            truncated_rows: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        num_rows: usize,
        num_cols: usize,
        rows: Vec<Vec<Entry>>,
        truncated_rows: Vec<usize>,
    ) -> Self {
        Self {
            num_rows,
            num_cols,
            rows,
            truncated_rows,
        }
    }

    pub(crate) fn into_rows(self) -> Vec<Vec<Entry>> {
        self.rows
    }

    /// The stored entries of row `i`.
    pub fn row(&self, i: usize) -> &[Entry] {
        &self.rows[i]
    }

    /// Iterates over the stored `(column, value)` pairs of row `i`.
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = Entry> + '_ {
        self.rows[i].iter().copied()
    }

    /// Number of stored entries in row `i` (sentinel entries included).
    pub fn row_len(&self, i: usize) -> usize {
        self.rows[i].len()
    }

    /// Total number of stored entries across all rows.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// True when no row lost entries to a capacity overflow.
    pub fn is_lossless(&self) -> bool {
        self.truncated_rows.is_empty()
    }

    /// Rows that were truncated by a capacity overflow, ascending.
    pub fn truncated_rows(&self) -> &[usize] {
        &self.truncated_rows
    }

    /// Expands the compressed representation back into a dense matrix.
    ///
    /// Sentinel entries write zeros and therefore leave their cells
    /// untouched, so a lossless compression round-trips exactly.
    pub fn to_dense(&self) -> DenseMatrix {
        let mut dense = DenseMatrix::zeros(self.num_rows, self.num_cols);
        for (i, row) in self.rows.iter().enumerate() {
            for &(col, val) in row {
                dense.set(i, col, val);
            }
        }
        dense
    }

    /// Writes the stored values, one space-separated line per row.
    ///
    /// Together with [`CompressedMatrix::write_columns`] this produces the
    /// two-file export format: both writers emit the same number of lines
    /// and the same number of tokens per line.
    pub fn write_values<W: Write>(&self, mut w: W) -> io::Result<()> {
        for row in &self.rows {
            for &(_, val) in row {
                write!(w, "{} ", val)?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    /// Writes the stored column indices, one space-separated line per row.
    pub fn write_columns<W: Write>(&self, mut w: W) -> io::Result<()> {
        for row in &self.rows {
            for &(col, _) in row {
                write!(w, "{} ", col)?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompressedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CompressedMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.num_rows, self.num_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;
        if !self.truncated_rows.is_empty() {
            writeln!(f, "  truncated rows: {:?}", self.truncated_rows)?;
        }

        let max_rows_to_print = 5.min(self.num_rows);
        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;
            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let row = &self.rows[i];
                let max_elements = 5.min(row.len());
                for &(col, val) in &row[..max_elements] {
                    write!(f, "({}, {}) ", col, val)?;
                }
                if row.len() > max_elements {
                    write!(f, "... ({} more)", row.len() - max_elements)?;
                }
                writeln!(f)?;
            }
            if self.num_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.num_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = CompressedMatrix::from_rows(2, 3, vec![vec![(0, 1), (2, 5)], vec![(1, -3)]]);
        assert_eq!(m.num_rows, 2);
        assert_eq!(m.num_cols, 3);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row(0), &[(0, 1), (2, 5)]);
        assert_eq!(m.row_len(1), 1);
        assert!(m.is_lossless());
    }

    #[test]
    fn test_empty_row_gets_sentinel() {
        let m = CompressedMatrix::from_rows(2, 3, vec![vec![], vec![(1, 4)]]);
        assert_eq!(m.row(0), &[(0, 0), (0, 0)]);
        assert_eq!(m.row_len(0), 2);
    }

    #[test]
    #[should_panic(expected = "column index 3 out of bounds")]
    fn test_out_of_bounds_column_rejected() {
        CompressedMatrix::from_rows(1, 3, vec![vec![(3, 1)]]);
    }

    #[test]
    fn test_to_dense() {
        let m = CompressedMatrix::from_rows(2, 3, vec![vec![(2, 7)], vec![]]);
        let dense = m.to_dense();
        assert_eq!(dense.row(0), &[0, 0, 7]);
        assert_eq!(dense.row(1), &[0, 0, 0]);
    }

    #[test]
    fn test_export_shape_matches() {
        let m = CompressedMatrix::from_rows(3, 4, vec![vec![(0, 1), (3, 2)], vec![], vec![(2, 9)]]);

        let mut values = Vec::new();
        let mut columns = Vec::new();
        m.write_values(&mut values).unwrap();
        m.write_columns(&mut columns).unwrap();

        let values = String::from_utf8(values).unwrap();
        let columns = String::from_utf8(columns).unwrap();

        let value_lines: Vec<_> = values.lines().collect();
        let column_lines: Vec<_> = columns.lines().collect();
        assert_eq!(value_lines.len(), 3);
        assert_eq!(value_lines.len(), column_lines.len());
        for (v, c) in value_lines.iter().zip(&column_lines) {
            assert_eq!(
                v.split_whitespace().count(),
                c.split_whitespace().count()
            );
        }
    }
}
