//! Lazy, column-parallel statistics over (time x series) float matrices.
//!
//! A [`Matrix`] owns a [`Frame`] and records builder calls as a pending
//! plan; nothing runs until [`Matrix::collect`]. Kernels treat NaN as the
//! missing-value sentinel and parallelize over the independent axis.
//!
//! [`Frame`]: qm_types::Frame

mod builders;
pub mod config;
mod matrix;
mod signal;

pub use builders::{Aggregate, Converter, Window};
pub use matrix::Matrix;

pub mod prelude {
    pub use qm_expr::{AggOp, Axis, BinaryOp, Conversion, Side, UnaryOp, WindowOp};
    pub use qm_types::{Error, Frame, Result, Shape, NAN, V};

    pub use crate::config::*;
    pub use crate::matrix::Matrix;
}
