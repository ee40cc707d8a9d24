//! Elementwise arithmetic and map kernels, with numpy-style 2D broadcasting
//! for reduced operands.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use qm_types::{Error, Frame, Result, Shape, NAN, V};

use crate::par::map_values;

/// The four elementwise arithmetic operators. Division by zero, overflow
/// and friends follow IEEE-754; they are never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, a: V, b: V) -> V {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

/// Which side of a binary operator a scalar sits on. `Left` with `Div`
/// is the inverse-scalar form `v / x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// The shape two operands combine into: equal axes pass through, an axis of
/// length 1 stretches to the other side's length.
pub fn broadcast_shape(left: Shape, right: Shape) -> Result<Shape> {
    fn axis(l: usize, r: usize) -> Option<usize> {
        if l == r {
            Some(l)
        } else if l == 1 {
            Some(r)
        } else if r == 1 {
            Some(l)
        } else {
            None
        }
    }
    match (axis(left.0, right.0), axis(left.1, right.1)) {
        (Some(rows), Some(cols)) => Ok((rows, cols)),
        _ => Err(Error::ShapeMismatch { left, right }),
    }
}

/// Combine two frames elementwise, broadcasting `(1, C)`, `(R, 1)` and
/// `(1, 1)` operands against the full shape.
pub fn combine(left: &Frame, right: &Frame, op: BinaryOp) -> Result<Frame> {
    let (rows, cols) = broadcast_shape(left.shape(), right.shape())?;
    let mut values = vec![NAN; rows * cols];
    values
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(r, out_row)| {
            let lrow = left.row(if left.rows() == 1 { 0 } else { r });
            let rrow = right.row(if right.rows() == 1 { 0 } else { r });
            for (c, out) in out_row.iter_mut().enumerate() {
                let a = lrow[if left.cols() == 1 { 0 } else { c }];
                let b = rrow[if right.cols() == 1 { 0 } else { c }];
                *out = op.apply(a, b);
            }
        });
    if left.shape() == (rows, cols) {
        Ok(left.with_values(values))
    } else if right.shape() == (rows, cols) {
        Ok(right.with_values(values))
    } else {
        Frame::new(rows, cols, values)
    }
}

/// Combine a frame with a scalar on the given side.
pub fn combine_scalar(frame: &Frame, value: V, side: Side, op: BinaryOp) -> Frame {
    match side {
        Side::Right => map_values(frame, |x| op.apply(x, value)),
        Side::Left => map_values(frame, |x| op.apply(value, x)),
    }
}

/// -1, 0 or +1 by sign; NaN propagates.
pub fn sign(frame: &Frame) -> Frame {
    map_values(frame, |v| if v == 0.0 { 0.0 } else { v.signum() })
}

pub fn abs(frame: &Frame) -> Frame {
    map_values(frame, V::abs)
}

/// `sqrt` of a negative is NaN per IEEE-754, never an error.
pub fn sqrt(frame: &Frame) -> Frame {
    map_values(frame, V::sqrt)
}

pub fn neg(frame: &Frame) -> Frame {
    map_values(frame, |v| -v)
}

/// Clip into `[-limit, limit]`; NaN passes through.
pub fn clip(frame: &Frame, limit: V) -> Frame {
    assert!(limit >= 0.0, "clip limit must be non-negative");
    map_values(frame, move |v| v.clamp(-limit, limit))
}

/// Keep the positive part of a signal; everything else (NaN included,
/// per IEEE comparison) becomes 0.
pub fn long_bias(frame: &Frame) -> Frame {
    map_values(frame, |v| if v > 0.0 { v } else { 0.0 })
}

/// Keep the negative part of a signal; everything else becomes 0.
pub fn short_bias(frame: &Frame) -> Frame {
    map_values(frame, |v| if v < 0.0 { v } else { 0.0 })
}
