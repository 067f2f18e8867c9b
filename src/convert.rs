//! Conversions between the row-compressed format and sprs matrices

use sprs::CsMat;

use crate::matrix::{CompressedMatrix, Entry};

/// Converts a compressed matrix to a sprs CSR matrix.
///
/// Zero-valued entries (the empty-row sentinel) carry no information and
/// are dropped; rows are sorted by column, as sprs requires. The result is
/// numerically identical to the source.
pub fn to_sprs(matrix: &CompressedMatrix) -> CsMat<i32> {
    let mut row_ptr = Vec::with_capacity(matrix.num_rows + 1);
    let mut col_idx = Vec::new();
    let mut values = Vec::new();

    row_ptr.push(0);
    for i in 0..matrix.num_rows {
        let mut entries: Vec<Entry> = matrix
            .row_iter(i)
            .filter(|&(_, val)| val != 0)
            .collect();
        entries.sort_by_key(|&(col, _)| col);

        for (col, val) in entries {
            col_idx.push(col);
            values.push(val);
        }
        row_ptr.push(col_idx.len());
    }

    CsMat::new((matrix.num_rows, matrix.num_cols), row_ptr, col_idx, values)
}

/// Converts a sprs matrix to the row-compressed format.
///
/// Rows without nonzero entries come back as the two-entry zero sentinel,
/// matching what the compressor would have produced.
pub fn from_sprs(matrix: CsMat<i32>) -> CompressedMatrix {
    let matrix = if matrix.is_csr() { matrix } else { matrix.to_csr() };
    let (n_rows, n_cols) = matrix.shape();

    let mut rows = Vec::with_capacity(n_rows);
    for row_vec in matrix.outer_iterator() {
        let row: Vec<Entry> = row_vec.iter().map(|(col, &val)| (col, val)).collect();
        rows.push(row);
    }

    CompressedMatrix::from_rows(n_rows, n_cols, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress_with_density;
    use crate::matrix::DenseMatrix;

    #[test]
    fn test_round_trip_through_sprs() {
        let dense = DenseMatrix::from_rows(vec![
            vec![1, 0, 2],
            vec![0, 0, 0],
            vec![0, -3, 0],
        ]);
        let compressed = compress_with_density(&dense, 0.5).unwrap();

        let round_tripped = from_sprs(to_sprs(&compressed));

        // Sentinel rows survive the round trip because from_sprs restores
        // the convention for empty rows.
        assert_eq!(round_tripped, compressed);
    }

    #[test]
    fn test_sprs_product_matches_ours() {
        let a_dense = DenseMatrix::from_rows(vec![vec![1, 2], vec![0, 3]]);
        let b_dense = DenseMatrix::from_rows(vec![vec![4, 5], vec![6, 7]]);

        let a = compress_with_density(&a_dense, 1.0).unwrap();
        let b = compress_with_density(&b_dense, 1.0).unwrap();

        let sprs_product = &to_sprs(&a) * &to_sprs(&b);
        let ours = crate::multiply::multiply(&a, &b, crate::multiply::Strategy::Sequential)
            .unwrap()
            .unwrap();

        let sprs_as_ours = from_sprs(sprs_product).to_dense();
        assert_eq!(sprs_as_ours, ours);
    }
}
