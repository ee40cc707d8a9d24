//! NaN-aware, column-parallel statistical kernels over [`Frame`]s.
//!
//! Every kernel reads one frame and returns a new one; input buffers are
//! never mutated. Column-independent kernels run one rayon task per column,
//! row-independent ones one task per row. Within a task the loop is strictly
//! sequential, so results are bit-identical across thread counts.
//!
//! [`Frame`]: qm_types::Frame

mod accum;
mod agg;
mod convert;
mod cross;
mod elem;
mod fill;
mod order;
mod par;
mod stats;
mod window;

pub use accum::{Kahan, M1, M2, M3, M4};
pub use agg::{
    agg_kurt, agg_max, agg_mean, agg_median, agg_min, agg_quantile, agg_rank, agg_skew, agg_stdev,
    agg_sum, agg_var, Axis,
};
pub use convert::{convert, shift, Conversion};
pub use cross::cross_rank;
pub use elem::{
    abs, broadcast_shape, clip, combine, combine_scalar, long_bias, neg, short_bias, sign, sqrt,
    BinaryOp, Side,
};
pub use fill::{backfill, fill_by_median, fill_zero, forward_fill};
pub use par::{map_columns, map_rows, map_values};
pub use window::{
    move_kurt, move_max, move_mean, move_median, move_min, move_quantile, move_rank, move_skew,
    move_stdev, move_sum, move_var,
};
