// Matrix data structures

pub mod compressed;
pub mod dense;

pub use compressed::{CompressedMatrix, Entry};
pub use dense::DenseMatrix;
