use log::{debug, trace};

use qm_kernels as k;
use qm_types::{Error, Frame, Result};

use crate::{AggOp, Expr, UnaryOp, WindowOp};

/// Execute a plan head to tail over `frame`, returning the materialized
/// result. The input is never mutated.
pub fn execute_plan(frame: &Frame, plan: &[Expr]) -> Result<Frame> {
    if plan.is_empty() {
        return Ok(frame.clone());
    }
    debug!(
        "materializing plan of {} nodes over {:?}",
        plan.len(),
        frame.shape()
    );
    let mut current = frame.clone();
    for node in plan {
        trace!("executing {:?} on {:?}", node, current.shape());
        current = execute(node, &current)?;
    }
    Ok(current)
}

/// Execute a single node: read one frame, return one frame.
pub fn execute(node: &Expr, data: &Frame) -> Result<Frame> {
    match node {
        Expr::Col => Ok(data.clone()),
        Expr::Literal(v) => Ok(Frame::scalar(*v)),
        Expr::Unary(op) => Ok(apply_unary(*op, data)),
        Expr::Binary { op, rhs } => {
            // A lazy right-hand side is collected before combining.
            let rhs = execute_plan(&rhs.frame, &rhs.plan)?;
            k::combine(data, &rhs, *op)
        }
        Expr::ScalarBinary { op, side, value } => Ok(k::combine_scalar(data, *value, *side, *op)),
        Expr::Window { op, len, min_len } => {
            let rows = data.rows();
            if *len < 1 || *min_len < 1 || min_len > len || *len > rows {
                return Err(Error::BadWindow {
                    len: *len,
                    min_len: *min_len,
                    rows,
                });
            }
            Ok(apply_window(*op, data, *len, *min_len))
        }
        Expr::Agg { op, axis } => Ok(apply_agg(*op, data, *axis)),
    }
}

fn apply_unary(op: UnaryOp, data: &Frame) -> Frame {
    match op {
        UnaryOp::Sign => k::sign(data),
        UnaryOp::Abs => k::abs(data),
        UnaryOp::Sqrt => k::sqrt(data),
        UnaryOp::Neg => k::neg(data),
        UnaryOp::Clip(limit) => k::clip(data, limit),
        UnaryOp::Backfill => k::backfill(data),
        UnaryOp::ForwardFill => k::forward_fill(data),
        UnaryOp::FillMedian => k::fill_by_median(data),
        UnaryOp::FillZero => k::fill_zero(data),
        UnaryOp::CrossRank => k::cross_rank(data),
        UnaryOp::Shift(n) => k::shift(data, n),
        UnaryOp::Convert(kind) => k::convert(data, kind),
        UnaryOp::LongBias => k::long_bias(data),
        UnaryOp::ShortBias => k::short_bias(data),
    }
}

fn apply_window(op: WindowOp, data: &Frame, len: usize, min_len: usize) -> Frame {
    match op {
        WindowOp::Mean => k::move_mean(data, len, min_len),
        WindowOp::Median => k::move_median(data, len, min_len),
        WindowOp::Max => k::move_max(data, len, min_len),
        WindowOp::Min => k::move_min(data, len, min_len),
        WindowOp::Sum => k::move_sum(data, len, min_len),
        WindowOp::Stdev => k::move_stdev(data, len, min_len),
        WindowOp::Var => k::move_var(data, len, min_len),
        WindowOp::Skew => k::move_skew(data, len, min_len),
        WindowOp::Kurt => k::move_kurt(data, len, min_len),
        WindowOp::Rank => k::move_rank(data, len, min_len),
        WindowOp::Quantile(q) => k::move_quantile(data, len, min_len, q),
    }
}

fn apply_agg(op: AggOp, data: &Frame, axis: crate::Axis) -> Frame {
    match op {
        AggOp::Mean => k::agg_mean(data, axis),
        AggOp::Median => k::agg_median(data, axis),
        AggOp::Max => k::agg_max(data, axis),
        AggOp::Min => k::agg_min(data, axis),
        AggOp::Sum => k::agg_sum(data, axis),
        AggOp::Stdev => k::agg_stdev(data, axis),
        AggOp::Var => k::agg_var(data, axis),
        AggOp::Skew => k::agg_skew(data, axis),
        AggOp::Kurt => k::agg_kurt(data, axis),
        AggOp::Rank => k::agg_rank(data, axis),
        AggOp::Quantile(q) => k::agg_quantile(data, axis, q),
    }
}
