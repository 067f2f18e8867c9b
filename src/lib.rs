//! # Gustav: row-compressed sparse matrix multiplication
//!
//! Gustav converts dense integer matrices into a compressed row-oriented
//! sparse representation and multiplies two such matrices into a dense
//! product, using one of three interchangeable execution strategies.
//!
//! ## Overview
//!
//! - **Codec**: per row, nonzero cells are stored as ordered
//!   `(column, value)` pairs; all-zero rows are held as a fixed two-entry
//!   zero sentinel. Compression runs row-parallel; a distributed variant
//!   scatters row blocks from a root, compresses them in place, and
//!   gathers the serialized result.
//! - **Engine**: a single row-wise accumulation kernel (Gustavson's
//!   method) drives the sequential, shared-memory, and distributed
//!   strategies. Output rows have exactly one owner under every strategy,
//!   so the product is independent of scheduling.
//! - **Communication**: distributed operations take an explicit
//!   [`Communicator`] (rank, size, transport) instead of reading ambient
//!   global state; an in-process channel-backed group is provided for
//!   tests and demos.
//!
//! ## Usage
//!
//! ```
//! use gustav::{compress_with_density, multiply, DenseMatrix, Strategy};
//!
//! let a = DenseMatrix::from_rows(vec![vec![1, 2], vec![0, 3]]);
//! let b = DenseMatrix::from_rows(vec![vec![4, 5], vec![6, 7]]);
//!
//! let a = compress_with_density(&a, 1.0).unwrap();
//! let b = compress_with_density(&b, 1.0).unwrap();
//!
//! let c = multiply(&a, &b, Strategy::Sequential).unwrap().unwrap();
//! assert_eq!(c.row(0), &[16, 19]);
//! assert_eq!(c.row(1), &[18, 21]);
//! ```

pub mod comm;
pub mod compress;
pub mod convert;
pub mod error;
pub mod matrix;
pub mod multiply;

// Re-export primary components
pub use comm::{block_partition, Communicator, LocalComm, LocalGroup};
pub use compress::distributed::{compress_centralized, compress_slice};
pub use compress::{compress, compress_with_density, CompressConfig};
pub use convert::{from_sprs, to_sprs};
pub use error::Error;
pub use matrix::{CompressedMatrix, DenseMatrix, Entry};
pub use multiply::{multiply, Combine, Schedule, Strategy};

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
