use thiserror::Error;

use crate::Shape;

/// Errors surfaced by builders and `collect()`.
///
/// Numerical conditions (division by zero, `log` of a non-positive value,
/// `sqrt` of a negative) are never errors; they produce NaN or infinities
/// per IEEE-754.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Binary arithmetic on two matrices whose shapes neither match nor
    /// broadcast.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Shape, right: Shape },

    /// Window parameters outside `1 <= min_len <= len <= rows`.
    #[error("window len {len} / min_len {min_len} out of range for {rows} rows")]
    BadWindow { len: usize, min_len: usize, rows: usize },

    /// A matrix must have at least one row and one column.
    #[error("empty matrix")]
    Empty,

    /// Raw buffer access on a matrix with a pending plan.
    #[error("matrix has a pending plan; call collect() before reading values")]
    Lazy,
}

pub type Result<T> = std::result::Result<T, Error>;
