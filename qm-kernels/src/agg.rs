//! Whole-series reductions.
//!
//! Same formulas as the sliding kernels, evaluated once over an entire
//! column (or row). NaNs are excluded from the count; an all-NaN series
//! reduces to NaN, never an error. Column reductions have shape
//! `(1, cols)`, row reductions `(rows, 1)`.

use serde::{Deserialize, Serialize};

use qm_types::{Frame, NAN, V};

use crate::accum::{M1, M4};
use crate::par::{fold_columns, fold_rows};
use crate::stats;

/// The axis a reduction collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Collapse every column: result is `(1, cols)`.
    Columns,
    /// Collapse every row: result is `(rows, 1)`.
    Rows,
}

fn reduce<F>(frame: &Frame, axis: Axis, f: F) -> Frame
where
    F: Fn(&[V]) -> V + Sync,
{
    match axis {
        Axis::Columns => fold_columns(frame, f),
        Axis::Rows => fold_rows(frame, f),
    }
}

fn series_count(xs: &[V]) -> usize {
    xs.iter().filter(|v| !v.is_nan()).count()
}

fn series_mean(xs: &[V]) -> V {
    let mut m = M1::default();
    let mut n = 0usize;
    for &v in xs {
        if !v.is_nan() {
            n += 1;
            m.add(v);
        }
    }
    if n == 0 {
        return NAN;
    }
    stats::mean(m.s1.value(), n) as V
}

fn series_sum(xs: &[V]) -> V {
    let mut m = M1::default();
    let mut n = 0usize;
    for &v in xs {
        if !v.is_nan() {
            n += 1;
            m.add(v);
        }
    }
    if n == 0 {
        return NAN;
    }
    m.s1.value() as V
}

/// All four moment sums plus the trailing equal-run, one pass.
fn series_moments(xs: &[V]) -> (M4, usize, usize) {
    let mut m = M4::default();
    let mut n = 0usize;
    let mut run = 0usize;
    let mut prev = NAN;
    for &v in xs {
        if v.is_nan() {
            continue;
        }
        n += 1;
        m.add(v);
        if v == prev {
            run += 1;
        } else {
            run = 1;
            prev = v;
        }
    }
    (m, n, run)
}

fn series_var(xs: &[V]) -> V {
    let (m, n, _) = series_moments(xs);
    if n < 2 {
        return NAN;
    }
    stats::sample_var(m.s1.value(), m.s2.value(), n) as V
}

fn series_stdev(xs: &[V]) -> V {
    let (m, n, _) = series_moments(xs);
    if n < 2 {
        return NAN;
    }
    let var = stats::sample_var(m.s1.value(), m.s2.value(), n);
    if var >= 0.0 {
        var.sqrt() as V
    } else {
        NAN
    }
}

fn series_skew(xs: &[V]) -> V {
    let (m, n, run) = series_moments(xs);
    stats::sample_skew(m.s1.value(), m.s2.value(), m.s3.value(), n, run >= n && n > 0) as V
}

fn series_kurt(xs: &[V]) -> V {
    let (m, n, run) = series_moments(xs);
    stats::excess_kurt(
        m.s1.value(),
        m.s2.value(),
        m.s3.value(),
        m.s4.value(),
        n,
        run >= n && n > 0,
    ) as V
}

fn series_min(xs: &[V]) -> V {
    xs.iter()
        .filter(|v| !v.is_nan())
        .fold(NAN, |acc, &v| if acc.is_nan() || v < acc { v } else { acc })
}

fn series_max(xs: &[V]) -> V {
    xs.iter()
        .filter(|v| !v.is_nan())
        .fold(NAN, |acc, &v| if acc.is_nan() || v > acc { v } else { acc })
}

pub(crate) fn series_quantile(xs: &[V], q: f64) -> V {
    let mut valid: Vec<V> = xs.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return NAN;
    }
    valid.sort_by(V::total_cmp);
    let k = valid.len();
    if k == 1 {
        return valid[0];
    }
    let pos = q * (k - 1) as f64;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    if frac == 0.0 {
        valid[lo]
    } else {
        let a = valid[lo] as f64;
        let b = valid[lo + 1] as f64;
        (a + (b - a) * frac) as V
    }
}

/// Normalized [0, 1] rank of the last non-NaN observation within its
/// series; equal older observations rank below it.
fn series_rank(xs: &[V]) -> V {
    let last = match xs.iter().rev().find(|v| !v.is_nan()) {
        Some(&v) => v,
        None => return NAN,
    };
    let k = series_count(xs);
    if k < 2 {
        return NAN;
    }
    let le = xs
        .iter()
        .filter(|v| !v.is_nan() && v.total_cmp(&last).is_le())
        .count();
    ((le - 1) as f64 / (k - 1) as f64) as V
}

pub fn agg_mean(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_mean)
}

pub fn agg_sum(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_sum)
}

pub fn agg_var(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_var)
}

pub fn agg_stdev(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_stdev)
}

pub fn agg_skew(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_skew)
}

pub fn agg_kurt(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_kurt)
}

pub fn agg_min(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_min)
}

pub fn agg_max(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_max)
}

pub fn agg_median(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, |xs| series_quantile(xs, 0.5))
}

pub fn agg_quantile(frame: &Frame, axis: Axis, q: V) -> Frame {
    assert!((0.0..=1.0).contains(&q), "quantile outside [0, 1]");
    let q = q as f64;
    reduce(frame, axis, move |xs| series_quantile(xs, q))
}

pub fn agg_rank(frame: &Frame, axis: Axis) -> Frame {
    reduce(frame, axis, series_rank)
}

#[cfg(test)]
mod tests {
    use qm_types::NAN;

    use super::*;

    fn sample() -> Frame {
        Frame::from_rows(vec![
            vec![1.0, NAN],
            vec![2.0, 4.0],
            vec![3.0, NAN],
            vec![4.0, 8.0],
        ])
        .unwrap()
    }

    #[test]
    fn column_reductions_skip_nans() {
        let f = sample();
        let mean = agg_mean(&f, Axis::Columns);
        assert_eq!(mean.shape(), (1, 2));
        assert_eq!(mean.values(), &[2.5, 6.0]);
        let sum = agg_sum(&f, Axis::Columns);
        assert_eq!(sum.values(), &[10.0, 12.0]);
    }

    #[test]
    fn row_reductions_have_column_shape() {
        let f = sample();
        let mx = agg_max(&f, Axis::Rows);
        assert_eq!(mx.shape(), (4, 1));
        assert_eq!(mx.values(), &[1.0, 4.0, 3.0, 8.0]);
    }

    #[test]
    fn all_nan_series_reduce_to_nan() {
        let f = Frame::from_rows(vec![vec![NAN, 1.0], vec![NAN, 2.0]]).unwrap();
        for out in [
            agg_mean(&f, Axis::Columns),
            agg_sum(&f, Axis::Columns),
            agg_median(&f, Axis::Columns),
            agg_stdev(&f, Axis::Columns),
        ] {
            assert!(out.get(0, 0).is_nan());
            assert!(!out.get(0, 1).is_nan());
        }
    }

    #[test]
    fn median_over_even_count_interpolates() {
        let f = sample();
        let med = agg_median(&f, Axis::Columns);
        assert_eq!(med.values(), &[2.5, 6.0]);
    }

    #[test]
    fn rank_of_last_observation() {
        let f = Frame::from_rows(vec![vec![5.0], vec![1.0], vec![NAN], vec![3.0]]).unwrap();
        let rank = agg_rank(&f, Axis::Columns);
        // 3 ranks between 1 and 5: position 1 of 2.
        assert_eq!(rank.get(0, 0), 0.5);
    }

    #[test]
    fn skew_kurt_constant_column() {
        let f = Frame::from_rows(vec![vec![2.0]; 5]).unwrap();
        assert_eq!(agg_skew(&f, Axis::Columns).get(0, 0), 0.0);
        assert_eq!(agg_kurt(&f, Axis::Columns).get(0, 0), -3.0);
    }
}
