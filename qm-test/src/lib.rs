//! Shared test support: seeded random matrices, from-scratch reference
//! statistics, and approximate-equality assertions.
//!
//! The reference statistics recompute every window independently, so they
//! are slow but obviously correct; kernel tests compare the incremental
//! results against them.

use itertools::izip;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use qm_types::{Frame, NAN, V};

/// A `rows x cols` frame of uniform values in [-1, 1).
pub fn uniform(rows: usize, cols: usize, seed: u64) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let values = (0..rows * cols)
        .map(|_| rng.gen_range(-1.0..1.0))
        .collect();
    Frame::new(rows, cols, values).unwrap()
}

/// A frame whose single column ramps `1, 2, ..., rows`.
pub fn ramp(rows: usize) -> Frame {
    Frame::new(rows, 1, (1..=rows).map(|i| i as V).collect()).unwrap()
}

/// Strictly positive values, usable as price levels.
pub fn prices(rows: usize, cols: usize, seed: u64) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let values = (0..rows * cols)
        .map(|_| rng.gen_range(20.0..180.0))
        .collect();
    Frame::new(rows, cols, values).unwrap()
}

/// Replace roughly `share` of the cells with NaN.
pub fn sprinkle_nans(frame: Frame, share: f64, seed: u64) -> Frame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let values = frame
        .values()
        .iter()
        .map(|&v| if rng.gen_bool(share) { NAN } else { v })
        .collect();
    frame.with_values(values)
}

/// Equal within `tol`, treating NaN == NaN as a match.
pub fn close(a: V, b: V, tol: V) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() <= tol
}

pub fn assert_close(actual: &[V], expected: &[V], tol: V) {
    assert_eq!(actual.len(), expected.len());
    for (i, (&a, &e)) in izip!(actual, expected).enumerate() {
        assert!(
            close(a, e, tol),
            "index {i}: actual {a} vs expected {e} (tol {tol})"
        );
    }
}

pub fn assert_frames_close(actual: &Frame, expected: &Frame, tol: V) {
    assert_eq!(actual.shape(), expected.shape());
    assert_close(actual.values(), expected.values(), tol);
}

fn valid(xs: &[V]) -> Vec<f64> {
    xs.iter()
        .filter(|v| !v.is_nan())
        .map(|&v| v as f64)
        .collect()
}

pub fn ref_mean(xs: &[V]) -> V {
    let v = valid(xs);
    if v.is_empty() {
        return NAN;
    }
    (v.iter().sum::<f64>() / v.len() as f64) as V
}

pub fn ref_sum(xs: &[V]) -> V {
    let v = valid(xs);
    if v.is_empty() {
        return NAN;
    }
    v.iter().sum::<f64>() as V
}

pub fn ref_var(xs: &[V]) -> V {
    let v = valid(xs);
    let n = v.len();
    if n < 2 {
        return NAN;
    }
    let m = v.iter().sum::<f64>() / n as f64;
    (v.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1) as f64) as V
}

pub fn ref_stdev(xs: &[V]) -> V {
    let var = ref_var(xs);
    if var.is_nan() {
        NAN
    } else {
        var.sqrt()
    }
}

fn all_equal(v: &[f64]) -> bool {
    v.windows(2).all(|w| w[0] == w[1])
}

pub fn ref_skew(xs: &[V]) -> V {
    let v = valid(xs);
    let n = v.len();
    if n < 3 {
        return NAN;
    }
    if all_equal(&v) {
        return 0.0;
    }
    let nf = n as f64;
    let m = v.iter().sum::<f64>() / nf;
    let var = v.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / nf;
    if var <= 1e-14 {
        return NAN;
    }
    let k3 = v.iter().map(|x| (x - m).powi(3)).sum::<f64>() / nf;
    ((nf * (nf - 1.0)).sqrt() * k3 / ((nf - 2.0) * var.powf(1.5))) as V
}

pub fn ref_kurt(xs: &[V]) -> V {
    let v = valid(xs);
    let n = v.len();
    if n < 4 {
        return NAN;
    }
    if all_equal(&v) {
        return -3.0;
    }
    let nf = n as f64;
    let m = v.iter().sum::<f64>() / nf;
    let var = v.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / nf;
    if var <= 1e-14 {
        return NAN;
    }
    let k4 = v.iter().map(|x| (x - m).powi(4)).sum::<f64>() / nf;
    (((nf * nf - 1.0) * k4 / (var * var) - 3.0 * (nf - 1.0) * (nf - 1.0))
        / ((nf - 2.0) * (nf - 3.0))) as V
}

pub fn ref_min(xs: &[V]) -> V {
    valid(xs).into_iter().fold(f64::NAN, f64::min) as V
}

pub fn ref_max(xs: &[V]) -> V {
    valid(xs).into_iter().fold(f64::NAN, f64::max) as V
}

pub fn ref_quantile(xs: &[V], q: f64) -> V {
    let mut v = valid(xs);
    if v.is_empty() {
        return NAN;
    }
    v.sort_by(f64::total_cmp);
    if v.len() == 1 {
        return v[0] as V;
    }
    let pos = q * (v.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    if frac == 0.0 {
        v[lo] as V
    } else {
        (v[lo] + (v[lo + 1] - v[lo]) * frac) as V
    }
}

pub fn ref_median(xs: &[V]) -> V {
    ref_quantile(xs, 0.5)
}

/// Rank of the last non-NaN element among the slice's non-NaN values,
/// normalized to [0, 1]; equal earlier values rank below it.
pub fn ref_rank_of_last(xs: &[V]) -> V {
    let last = match xs.iter().rev().find(|v| !v.is_nan()) {
        Some(&v) => v,
        None => return NAN,
    };
    let v = valid(xs);
    if v.len() < 2 {
        return NAN;
    }
    let le = v.iter().filter(|&&x| x <= last as f64).count();
    ((le - 1) as f64 / (v.len() - 1) as f64) as V
}

/// From-scratch window statistic: for every row, recompute `stat` over the
/// trailing window slice, guarded by the non-NaN `min_len` count.
pub fn naive_window(frame: &Frame, len: usize, min_len: usize, stat: fn(&[V]) -> V) -> Frame {
    let (rows, cols) = frame.shape();
    let mut values = vec![NAN; rows * cols];
    for c in 0..cols {
        let col = frame.column(c);
        for r in 0..rows {
            let start = (r + 1).saturating_sub(len);
            let window = &col[start..=r];
            let count = window.iter().filter(|v| !v.is_nan()).count();
            if count >= min_len {
                values[r * cols + c] = stat(window);
            }
        }
    }
    frame.with_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(uniform(8, 3, 5).values(), uniform(8, 3, 5).values());
        let sprinkled = sprinkle_nans(uniform(100, 2, 1), 0.3, 2);
        assert!(sprinkled.values().iter().any(|v| v.is_nan()));
        assert!(sprinkled.values().iter().any(|v| !v.is_nan()));
    }

    #[test]
    fn reference_stats_on_known_data() {
        let xs = [2.0, 4.0, NAN, 6.0];
        assert_eq!(ref_mean(&xs), 4.0);
        assert_eq!(ref_sum(&xs), 12.0);
        assert_eq!(ref_var(&xs), 4.0);
        assert_eq!(ref_stdev(&xs), 2.0);
        assert_eq!(ref_min(&xs), 2.0);
        assert_eq!(ref_max(&xs), 6.0);
        assert_eq!(ref_median(&xs), 4.0);
    }

    #[test]
    fn naive_window_honors_min_len() {
        let f = Frame::new(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
        let out = naive_window(&f, 2, 2, ref_mean);
        assert!(out.get(0, 0).is_nan());
        assert_eq!(out.get(1, 0), 1.5);
        assert_eq!(out.get(2, 0), 2.5);
    }
}
