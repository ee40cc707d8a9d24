//! Tagged expression nodes and the lazy plan executor.
//!
//! A plan is an ordered sequence of nodes folded over a frame: every node
//! reads the running buffer and returns a fresh one. Binary nodes carry
//! their right-hand operand as a frame plus its own pending plan, which is
//! collected recursively when the node executes.

mod plan;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use qm_types::{Frame, Shape, V};

pub use plan::{execute, execute_plan};
pub use qm_kernels::{Axis, BinaryOp, Conversion, Side};

/// Elementwise and structural single-operand operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UnaryOp {
    Sign,
    Abs,
    Sqrt,
    Neg,
    /// Clip into `[-limit, limit]`.
    Clip(V),
    Backfill,
    ForwardFill,
    FillMedian,
    FillZero,
    CrossRank,
    /// Rows down for positive counts, up for negative.
    Shift(isize),
    Convert(Conversion),
    LongBias,
    ShortBias,
}

/// Sliding-window statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowOp {
    Mean,
    Median,
    Max,
    Min,
    Sum,
    Stdev,
    Var,
    Skew,
    Kurt,
    Rank,
    Quantile(V),
}

/// Whole-series reductions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AggOp {
    Mean,
    Median,
    Max,
    Min,
    Sum,
    Stdev,
    Var,
    Skew,
    Kurt,
    Rank,
    Quantile(V),
}

/// A frame together with its pending plan; the lazy right-hand side of a
/// binary node.
#[derive(Debug, Clone)]
pub struct LazyFrame {
    pub frame: Arc<Frame>,
    pub plan: Vec<Expr>,
}

impl LazyFrame {
    pub fn eager(frame: Frame) -> LazyFrame {
        LazyFrame {
            frame: Arc::new(frame),
            plan: Vec::new(),
        }
    }

    /// The shape this operand will have once collected.
    pub fn planned_shape(&self) -> Shape {
        planned_shape(self.frame.shape(), &self.plan)
    }
}

/// One node of a plan.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Identity: passes the running buffer through.
    Col,
    /// Replaces the buffer with a broadcast-compatible scalar.
    Literal(V),
    Unary(UnaryOp),
    Binary { op: BinaryOp, rhs: LazyFrame },
    ScalarBinary { op: BinaryOp, side: Side, value: V },
    Window { op: WindowOp, len: usize, min_len: usize },
    Agg { op: AggOp, axis: Axis },
}

/// Fold a plan's effect on a starting shape without executing it.
///
/// Binary broadcasting is not resolved here; builders validate operand
/// shapes when the node is pushed, and `collect()` re-checks.
pub fn planned_shape(start: Shape, plan: &[Expr]) -> Shape {
    plan.iter().fold(start, |shape, node| match node {
        Expr::Literal(_) => (1, 1),
        Expr::Agg {
            axis: Axis::Columns,
            ..
        } => (1, shape.1),
        Expr::Agg {
            axis: Axis::Rows, ..
        } => (shape.0, 1),
        Expr::Binary { rhs, .. } => {
            qm_kernels::broadcast_shape(shape, rhs.planned_shape()).unwrap_or(shape)
        }
        _ => shape,
    })
}
