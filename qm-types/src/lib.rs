//! Core types shared by the whole workspace: the scalar alias, the 2D
//! frame, and the common error enum.

mod error;
mod frame;

pub use error::{Error, Result};
pub use frame::Frame;

/// The scalar type of every matrix. Single precision by default; the `f64`
/// feature switches the whole workspace to double precision. Mixing both in
/// one build is not supported.
#[cfg(not(feature = "f64"))]
pub type V = f32;
#[cfg(feature = "f64")]
pub type V = f64;

/// The missing-value sentinel. NaN is the only sentinel; infinities are
/// ordinary finite-arithmetic inputs.
pub const NAN: V = V::NAN;

/// A `(rows, cols)` pair.
pub type Shape = (usize, usize);
