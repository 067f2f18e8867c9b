//! Multi-participant construction of compressed matrices
//!
//! Two modes exist. Pre-partitioned: the caller already owns a contiguous
//! row slice and compresses it locally with no communication. Centralized:
//! the root owns the full dense matrix and the group builds the compressed
//! matrix together as a collective — scatter the row blocks, compress each
//! slice locally, then gather the serialized blocks back at the root.
//!
//! Wire format of one serialized block, as a flat `i32` stream:
//! `[local_row_count, then per row: entry_count, values…, column_indices…]`.

use tracing::debug;

use crate::comm::{block_partition, Communicator};
use crate::compress::{compress, CompressConfig};
use crate::error::Error;
use crate::matrix::{CompressedMatrix, DenseMatrix, Entry};

/// Compresses a contiguous row slice the caller already owns.
///
/// Used when an external caller has split the work beforehand; runs the
/// local algorithm with no communication.
pub fn compress_slice(local: &DenseMatrix, config: &CompressConfig) -> Result<CompressedMatrix, Error> {
    compress(local, config)
}

/// Collectively compresses a dense matrix held in full at `root`.
///
/// Every participant in `comm` must call this together with matching
/// `total_rows`, `cols`, and `root`. Row ownership follows the contiguous
/// block partition. The full compressed matrix exists only at the root:
/// the root gets `Ok(Some(matrix))`, everyone else `Ok(None)`.
///
/// Remote truncation flags do not survive serialization; the assembled
/// matrix always reports itself lossless.
///
/// # Panics
///
/// Panics if the root's `dense` is missing or does not have the announced
/// shape.
pub fn compress_centralized(
    dense: Option<&DenseMatrix>,
    total_rows: usize,
    cols: usize,
    config: &CompressConfig,
    root: usize,
    comm: &dyn Communicator,
) -> Result<Option<CompressedMatrix>, Error> {
    let rank = comm.rank();
    let size = comm.size();
    let ranges = block_partition(total_rows, size);

    let flat = if rank == root {
        let dense = dense.expect("root must hold the full dense matrix");
        assert_eq!(dense.rows(), total_rows, "root matrix row count must match total_rows");
        assert_eq!(dense.cols(), cols, "root matrix column count must match cols");
        Some(dense.as_flat())
    } else {
        None
    };

    // Element counts per rank: whole rows, row-major.
    let counts: Vec<usize> = ranges.iter().map(|r| r.len() * cols).collect();
    let local_flat = comm.scatterv(root, flat, &counts)?;

    let local_rows = ranges[rank].len();
    let local_dense = DenseMatrix::from_flat(local_rows, cols, local_flat);
    let local = compress(&local_dense, config)?;
    debug!(rank, local_rows, nnz = local.nnz(), "compressed local row block");

    if rank != root {
        comm.send(root, &encode_rows(&local))?;
        return Ok(None);
    }

    let mut rows = Vec::new();
    rows.try_reserve_exact(total_rows)?;
    for r in 0..size {
        let block = if r == root {
            local.clone().into_rows()
        } else {
            decode_rows(&comm.recv(r)?, cols)?
        };
        if block.len() != ranges[r].len() {
            return Err(Error::Communication(format!(
                "rank {} delivered {} rows, partition assigned {}",
                r,
                block.len(),
                ranges[r].len()
            )));
        }
        rows.extend(block);
    }

    Ok(Some(CompressedMatrix::from_rows_unchecked(total_rows, cols, rows)))
}

/// Serializes a compressed matrix's rows into one flat `i32` buffer.
pub(crate) fn encode_rows(matrix: &CompressedMatrix) -> Vec<i32> {
    let mut buf = Vec::with_capacity(1 + matrix.num_rows + 2 * matrix.nnz());
    buf.push(matrix.num_rows as i32);
    for i in 0..matrix.num_rows {
        let row = matrix.row(i);
        buf.push(row.len() as i32);
        buf.extend(row.iter().map(|&(_, val)| val));
        buf.extend(row.iter().map(|&(col, _)| col as i32));
    }
    buf
}

/// Deserializes a flat buffer produced by [`encode_rows`].
///
/// Any structural defect (short buffer, negative counts, column index out
/// of `num_cols`) is treated as a communication failure: the data cannot
/// be trusted once the stream is inconsistent.
pub(crate) fn decode_rows(buf: &[i32], num_cols: usize) -> Result<Vec<Vec<Entry>>, Error> {
    fn malformed() -> Error {
        Error::Communication("malformed compressed row block".into())
    }

    fn take<'a>(buf: &'a [i32], pos: &mut usize, n: usize) -> Result<&'a [i32], Error> {
        let end = pos
            .checked_add(n)
            .filter(|&end| end <= buf.len())
            .ok_or_else(malformed)?;
        let slice = &buf[*pos..end];
        *pos = end;
        Ok(slice)
    }

    let mut pos = 0;
    let n_rows = usize::try_from(take(buf, &mut pos, 1)?[0]).map_err(|_| malformed())?;
    let mut rows = Vec::new();
    rows.try_reserve_exact(n_rows)?;

    for _ in 0..n_rows {
        let len = usize::try_from(take(buf, &mut pos, 1)?[0]).map_err(|_| malformed())?;
        let values = take(buf, &mut pos, len)?;
        let columns = take(buf, &mut pos, len)?;

        let mut row = Vec::new();
        row.try_reserve_exact(len)?;
        for (&val, &col) in values.iter().zip(columns) {
            let col = usize::try_from(col).map_err(|_| malformed())?;
            if col >= num_cols {
                return Err(malformed());
            }
            row.push((col, val));
        }
        rows.push(row);
    }

    if pos != buf.len() {
        return Err(malformed());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress_with_density;

    #[test]
    fn test_encode_decode_round_trip() {
        let dense = DenseMatrix::from_rows(vec![
            vec![1, 0, -3, 0],
            vec![0, 0, 0, 0],
            vec![0, 9, 0, 2],
        ]);
        let compressed = compress_with_density(&dense, 0.5).unwrap();

        let wire = encode_rows(&compressed);
        let rows = decode_rows(&wire, 4).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![(0, 1), (2, -3)]);
        assert_eq!(rows[1], vec![(0, 0), (0, 0)]);
        assert_eq!(rows[2], vec![(1, 9), (3, 2)]);
    }

    #[test]
    fn test_decode_rejects_short_buffer() {
        let err = decode_rows(&[2, 3, 1], 4).unwrap_err();
        assert!(matches!(err, Error::Communication(_)));
    }

    #[test]
    fn test_decode_rejects_out_of_range_column() {
        // One row, one entry, value 5, column 7 in a 4-column matrix.
        let err = decode_rows(&[1, 1, 5, 7], 4).unwrap_err();
        assert!(matches!(err, Error::Communication(_)));
    }

    #[test]
    fn test_decode_rejects_trailing_garbage() {
        let err = decode_rows(&[1, 1, 5, 2, 0], 4).unwrap_err();
        assert!(matches!(err, Error::Communication(_)));
    }
}
