//! Dense row-major matrix used as multiplication input and output

use std::fmt;

use ndarray::{Array2, ArrayView2};

/// A dense integer matrix in row-major layout.
///
/// Purely a data holder: every cell starts at zero, cells are written only
/// during the accumulation phase of one multiply call, and the matrix is
/// read-only once that call returns. Dropping the value releases it.
#[derive(Clone, PartialEq, Eq)]
pub struct DenseMatrix {
    data: Array2<i32>,
}

impl DenseMatrix {
    /// Creates a matrix of the given shape with every cell set to zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Builds a matrix from nested row vectors.
    ///
    /// # Panics
    ///
    /// Panics if the rows have unequal lengths.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());

        let mut flat = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n_cols, "row {} has length {}, expected {}", i, row.len(), n_cols);
            flat.extend_from_slice(row);
        }

        Self::from_flat(n_rows, n_cols, flat)
    }

    /// Builds a matrix from a flat row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<i32>) -> Self {
        assert_eq!(data.len(), rows * cols, "flat buffer length must be rows * cols");
        Self {
            data: Array2::from_shape_vec((rows, cols), data)
                .expect("shape checked against buffer length"),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Reads one cell.
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[[row, col]]
    }

    /// Writes one cell.
    pub fn set(&mut self, row: usize, col: usize, value: i32) {
        self.data[[row, col]] = value;
    }

    /// Borrows row `i` as a contiguous slice.
    pub fn row(&self, i: usize) -> &[i32] {
        self.data.row(i).to_slice().expect("row-major layout")
    }

    /// Mutably borrows row `i` as a contiguous slice.
    pub(crate) fn row_mut(&mut self, i: usize) -> &mut [i32] {
        self.data.row_mut(i).into_slice().expect("row-major layout")
    }

    /// Borrows the whole matrix as one row-major slice.
    pub fn as_flat(&self) -> &[i32] {
        self.data.as_slice().expect("row-major layout")
    }

    /// A 2-D `ndarray` view for interop with array-based code.
    pub fn view(&self) -> ArrayView2<'_, i32> {
        self.data.view()
    }
}

impl fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows() {
            for &v in self.row(i) {
                write!(f, "{:2} ", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DenseMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.rows(), self.cols())?;

        let max_rows_to_print = 5.min(self.rows());
        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;
            for i in 0..max_rows_to_print {
                let row = self.row(i);
                let max_elements = 8.min(row.len());
                write!(f, "    row {}: {:?}", i, &row[..max_elements])?;
                if row.len() > max_elements {
                    write!(f, " ... ({} more)", row.len() - max_elements)?;
                }
                writeln!(f)?;
            }
            if self.rows() > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.rows() - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}
