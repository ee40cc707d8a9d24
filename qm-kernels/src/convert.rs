//! Return-space conversions between the four representations of a price
//! series: equity (price level), pct (simple return), log (log return) and
//! equity_log (cumulative log level).
//!
//! Differencing conversions fabricate a NaN first row; every other
//! conversion preserves the NaN mask of its input. Cumulative conversions
//! treat NaN as a zero return internally and restore the mask afterwards.

use itertools::izip;
use serde::{Deserialize, Serialize};

use qm_types::{Frame, NAN, V};

use crate::accum::Kahan;
use crate::par::{map_columns, map_values};

/// An edge of the conversion graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conversion {
    EquityToLog,
    EquityToPct,
    EquityToEquityLog,
    EquityLogToEquity,
    EquityLogToLog,
    PctToEquity,
    PctToLog,
    LogToPct,
    LogToEquityLog,
    PctToEquityLog,
}

pub fn convert(frame: &Frame, kind: Conversion) -> Frame {
    use Conversion::*;
    match kind {
        EquityToLog => map_columns(frame, |col, out| {
            for i in 1..col.len() {
                out[i] = (col[i] / col[i - 1]).ln();
            }
        }),
        EquityToPct => map_columns(frame, |col, out| {
            for i in 1..col.len() {
                out[i] = col[i] / col[i - 1] - 1.0;
            }
        }),
        EquityToEquityLog => map_values(frame, V::ln),
        EquityLogToEquity => map_values(frame, V::exp),
        EquityLogToLog => map_columns(frame, |col, out| {
            for i in 1..col.len() {
                out[i] = col[i] - col[i - 1];
            }
        }),
        PctToEquity => map_columns(frame, |col, out| {
            let mut level = 1.0f64;
            for (o, &v) in izip!(out.iter_mut(), col) {
                if v.is_nan() {
                    continue;
                }
                level *= 1.0 + v as f64;
                *o = level as V;
            }
        }),
        PctToLog => map_values(frame, V::ln_1p),
        LogToPct => map_values(frame, V::exp_m1),
        LogToEquityLog => map_columns(frame, |col, out| {
            let mut acc = Kahan::default();
            for (o, &v) in izip!(out.iter_mut(), col) {
                if v.is_nan() {
                    continue;
                }
                acc.add(v as f64);
                *o = acc.value() as V;
            }
        }),
        PctToEquityLog => map_columns(frame, |col, out| {
            let mut acc = Kahan::default();
            for (o, &v) in izip!(out.iter_mut(), col) {
                if v.is_nan() {
                    continue;
                }
                acc.add(v.ln_1p() as f64);
                *o = acc.value() as V;
            }
        }),
    }
}

/// Shift rows down by `k` (`k > 0`, leading rows NaN) or up by `-k`
/// (trailing rows NaN). Rows are contiguous, so this is one block copy.
pub fn shift(frame: &Frame, k: isize) -> Frame {
    let (rows, cols) = frame.shape();
    let mut values = vec![NAN; rows * cols];
    let offset = k.unsigned_abs();
    if offset < rows {
        let moved = (rows - offset) * cols;
        if k >= 0 {
            values[offset * cols..].copy_from_slice(&frame.values()[..moved]);
        } else {
            values[..moved].copy_from_slice(&frame.values()[offset * cols..]);
        }
    }
    frame.with_values(values)
}
