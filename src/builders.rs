//! Fluent builders behind [`Matrix::rolling`], [`Matrix::agg`] and
//! [`Matrix::convert`]. Each method appends one node to the plan and
//! returns a new matrix.

use qm_expr::{AggOp, Axis, Conversion, Expr, WindowOp};
use qm_types::V;

use crate::matrix::Matrix;

/// A validated trailing window over a matrix.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    parent: &'a Matrix,
    len: usize,
    min_len: usize,
}

impl<'a> Window<'a> {
    pub(crate) fn new(parent: &'a Matrix, len: usize, min_len: usize) -> Window<'a> {
        Window {
            parent,
            len,
            min_len,
        }
    }

    fn build(&self, op: WindowOp) -> Matrix {
        self.parent.push(Expr::Window {
            op,
            len: self.len,
            min_len: self.min_len,
        })
    }

    pub fn mean(&self) -> Matrix {
        self.build(WindowOp::Mean)
    }

    pub fn median(&self) -> Matrix {
        self.build(WindowOp::Median)
    }

    pub fn max(&self) -> Matrix {
        self.build(WindowOp::Max)
    }

    pub fn min(&self) -> Matrix {
        self.build(WindowOp::Min)
    }

    pub fn sum(&self) -> Matrix {
        self.build(WindowOp::Sum)
    }

    pub fn stdev(&self) -> Matrix {
        self.build(WindowOp::Stdev)
    }

    pub fn var(&self) -> Matrix {
        self.build(WindowOp::Var)
    }

    pub fn skew(&self) -> Matrix {
        self.build(WindowOp::Skew)
    }

    pub fn kurt(&self) -> Matrix {
        self.build(WindowOp::Kurt)
    }

    /// Trailing rank of the current element, normalized to [0, 1].
    pub fn rank(&self) -> Matrix {
        self.build(WindowOp::Rank)
    }

    /// Interpolated quantile, q in (0, 1).
    pub fn quantile(&self, q: V) -> Matrix {
        self.build(WindowOp::Quantile(q))
    }
}

/// Whole-series reductions along one axis.
#[derive(Debug, Clone, Copy)]
pub struct Aggregate<'a> {
    parent: &'a Matrix,
    axis: Axis,
}

impl<'a> Aggregate<'a> {
    pub(crate) fn columns(parent: &'a Matrix) -> Aggregate<'a> {
        Aggregate {
            parent,
            axis: Axis::Columns,
        }
    }

    pub(crate) fn rows(parent: &'a Matrix) -> Aggregate<'a> {
        Aggregate {
            parent,
            axis: Axis::Rows,
        }
    }

    fn build(&self, op: AggOp) -> Matrix {
        let shape = match self.axis {
            Axis::Columns => (1, self.parent.cols()),
            Axis::Rows => (self.parent.rows(), 1),
        };
        self.parent.push_shaped(
            Expr::Agg {
                op,
                axis: self.axis,
            },
            shape,
        )
    }

    pub fn mean(&self) -> Matrix {
        self.build(AggOp::Mean)
    }

    pub fn median(&self) -> Matrix {
        self.build(AggOp::Median)
    }

    pub fn max(&self) -> Matrix {
        self.build(AggOp::Max)
    }

    pub fn min(&self) -> Matrix {
        self.build(AggOp::Min)
    }

    pub fn sum(&self) -> Matrix {
        self.build(AggOp::Sum)
    }

    pub fn stdev(&self) -> Matrix {
        self.build(AggOp::Stdev)
    }

    pub fn var(&self) -> Matrix {
        self.build(AggOp::Var)
    }

    pub fn skew(&self) -> Matrix {
        self.build(AggOp::Skew)
    }

    pub fn kurt(&self) -> Matrix {
        self.build(AggOp::Kurt)
    }

    /// Normalized rank of the last observation within its series.
    pub fn rank(&self) -> Matrix {
        self.build(AggOp::Rank)
    }

    pub fn quantile(&self, q: V) -> Matrix {
        self.build(AggOp::Quantile(q))
    }
}

/// Edges of the return-space conversion graph.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    parent: &'a Matrix,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(parent: &'a Matrix) -> Converter<'a> {
        Converter { parent }
    }

    pub fn equity_to_log(&self) -> Matrix {
        self.parent.push_convert(Conversion::EquityToLog)
    }

    pub fn equity_to_pct(&self) -> Matrix {
        self.parent.push_convert(Conversion::EquityToPct)
    }

    pub fn equity_to_equity_log(&self) -> Matrix {
        self.parent.push_convert(Conversion::EquityToEquityLog)
    }

    pub fn equity_log_to_equity(&self) -> Matrix {
        self.parent.push_convert(Conversion::EquityLogToEquity)
    }

    pub fn equity_log_to_log(&self) -> Matrix {
        self.parent.push_convert(Conversion::EquityLogToLog)
    }

    pub fn pct_to_equity(&self) -> Matrix {
        self.parent.push_convert(Conversion::PctToEquity)
    }

    pub fn pct_to_log(&self) -> Matrix {
        self.parent.push_convert(Conversion::PctToLog)
    }

    pub fn log_to_pct(&self) -> Matrix {
        self.parent.push_convert(Conversion::LogToPct)
    }

    pub fn log_to_equity_log(&self) -> Matrix {
        self.parent.push_convert(Conversion::LogToEquityLog)
    }

    pub fn pct_to_equity_log(&self) -> Matrix {
        self.parent.push_convert(Conversion::PctToEquityLog)
    }

    /// One step back in time: row `i` copies row `i - 1`.
    pub fn shift(&self) -> Matrix {
        self.parent.shift(1)
    }
}
