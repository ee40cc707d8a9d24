//! Missing-value repair.

use itertools::izip;

use qm_types::{Frame, NAN, V};

use crate::agg::series_quantile;
use crate::par::{map_columns, map_values};

/// Propagate the next non-NaN value backwards within each column. Cells
/// after the last observation stay NaN.
pub fn backfill(frame: &Frame) -> Frame {
    map_columns(frame, |col, out| {
        let mut next = NAN;
        for i in (0..col.len()).rev() {
            if !col[i].is_nan() {
                next = col[i];
            }
            out[i] = next;
        }
    })
}

/// Propagate the previous non-NaN value forwards within each column.
/// Leading cells stay NaN.
pub fn forward_fill(frame: &Frame) -> Frame {
    map_columns(frame, |col, out| {
        let mut prev = NAN;
        for (o, &v) in izip!(out.iter_mut(), col) {
            if !v.is_nan() {
                prev = v;
            }
            *o = prev;
        }
    })
}

/// Replace NaN with the median of the column's non-NaN values. An all-NaN
/// column is left untouched.
pub fn fill_by_median(frame: &Frame) -> Frame {
    map_columns(frame, |col, out| {
        let median = series_quantile(col, 0.5);
        for (o, &v) in izip!(out.iter_mut(), col) {
            *o = if v.is_nan() { median } else { v };
        }
    })
}

/// NaN -> 0, on a fresh buffer.
pub fn fill_zero(frame: &Frame) -> Frame {
    map_values(frame, |v| if v.is_nan() { 0.0 } else { v })
}
