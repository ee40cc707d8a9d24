//! The universal invariants of the kernel library, checked on seeded
//! random inputs.

use qm_test::{
    assert_frames_close, naive_window, prices, ref_kurt, ref_max, ref_mean, ref_median,
    ref_min, ref_skew, ref_stdev, ref_sum, ref_var, sprinkle_nans, uniform,
};
use quantmat::prelude::*;

fn collect(m: Matrix) -> Frame {
    m.collect().unwrap().frame().unwrap().clone()
}

fn market(rows: usize, cols: usize) -> Matrix {
    Matrix::new(sprinkle_nans(uniform(rows, cols, 3), 0.1, 4))
}

#[test]
fn unary_and_window_nodes_preserve_shape() {
    let m = market(40, 5);
    let shape = m.shape();
    let outputs = [
        m.abs(),
        m.sign(),
        m.sqrt(),
        m.neg(),
        m.clip(0.5),
        m.shift(3),
        m.shift(-2),
        m.cross_rank(),
        m.backfill(),
        m.forward_fill(),
        m.fill_nan(),
        m.fill_by_median(),
        m.rolling(7).unwrap().mean(),
        m.window(10, 2).unwrap().kurt(),
        m.expanding(5).unwrap().median(),
        m.convert().pct_to_equity(),
        m.mul_scalar(2.0),
    ];
    for out in outputs {
        assert_eq!(collect(out).shape(), shape);
    }
}

#[test]
fn reductions_have_reduced_shape() {
    let m = market(40, 5);
    assert_eq!(collect(m.agg().mean()).shape(), (1, 5));
    assert_eq!(collect(m.agg().quantile(0.9)).shape(), (1, 5));
    assert_eq!(collect(m.agg_rows().sum()).shape(), (40, 1));
}

#[test]
fn conversions_preserve_the_nan_mask() {
    let m = market(30, 4);
    let input = collect(m.clone());
    let conversions = [
        m.convert().equity_to_log(),
        m.convert().equity_to_pct(),
        m.convert().equity_to_equity_log(),
        m.convert().equity_log_to_equity(),
        m.convert().equity_log_to_log(),
        m.convert().pct_to_equity(),
        m.convert().pct_to_log(),
        m.convert().log_to_pct(),
        m.convert().log_to_equity_log(),
        m.convert().pct_to_equity_log(),
    ];
    for out in conversions {
        let out = collect(out);
        for (i, (&x, &y)) in input.values().iter().zip(out.values()).enumerate() {
            assert!(!x.is_nan() || y.is_nan(), "cell {i} lost its NaN");
        }
    }
}

#[test]
fn window_extremes_bracket_the_mean() {
    let m = market(80, 4);
    let lo = collect(m.window(12, 3).unwrap().min());
    let hi = collect(m.window(12, 3).unwrap().max());
    let mid = collect(m.window(12, 3).unwrap().mean());
    for ((&l, &h), &c) in lo.values().iter().zip(hi.values()).zip(mid.values()) {
        if l.is_nan() || h.is_nan() || c.is_nan() {
            continue;
        }
        assert!(h >= l);
        assert!(c >= l - 1e-5 && c <= h + 1e-5);
    }
}

#[test]
fn pct_equity_round_trip_is_proportional() {
    let m = Matrix::new(prices(60, 3, 8));
    let input = collect(m.clone());
    let back = collect(m.convert().equity_to_pct().convert().pct_to_equity());
    for c in 0..3 {
        // Row 0 is fabricated NaN by the differencing step.
        let ratio0 = back.get(1, c) / input.get(1, c);
        for r in 1..60 {
            let ratio = back.get(r, c) / input.get(r, c);
            assert!(
                (ratio - ratio0).abs() < 1e-5,
                "column {c} row {r}: {ratio} vs {ratio0}"
            );
        }
    }
}

#[test]
fn cross_rank_spans_the_unit_interval() {
    let m = market(50, 6);
    let out = collect(m.cross_rank());
    for r in 0..50 {
        let row = out.row(r);
        let valid: Vec<V> = row.iter().copied().filter(|v| !v.is_nan()).collect();
        if valid.is_empty() {
            continue;
        }
        assert!(valid.len() >= 2);
        assert!(valid.iter().all(|&v| (-1.0..=1.0).contains(&v)));
        assert!(valid.iter().any(|&v| v == -1.0));
        assert!(valid.iter().any(|&v| v == 1.0));
    }
}

#[test]
fn incremental_windows_match_batch_recomputation() {
    let frame = sprinkle_nans(uniform(150, 5, 21), 0.12, 22);
    let m = Matrix::new(frame.clone());
    let cases: &[(usize, usize)] = &[(1, 1), (4, 2), (25, 10), (150, 40)];
    for &(len, min_len) in cases {
        let w = m.window(len, min_len).unwrap();
        assert_frames_close(
            &collect(w.mean()),
            &naive_window(&frame, len, min_len, ref_mean),
            1e-4,
        );
        assert_frames_close(
            &collect(w.sum()),
            &naive_window(&frame, len, min_len, ref_sum),
            1e-4,
        );
        assert_frames_close(
            &collect(w.var()),
            &naive_window(&frame, len, min_len, ref_var),
            1e-4,
        );
        assert_frames_close(
            &collect(w.stdev()),
            &naive_window(&frame, len, min_len, ref_stdev),
            1e-4,
        );
        assert_frames_close(
            &collect(w.skew()),
            &naive_window(&frame, len, min_len, ref_skew),
            1e-3,
        );
        assert_frames_close(
            &collect(w.kurt()),
            &naive_window(&frame, len, min_len, ref_kurt),
            1e-3,
        );
        assert_frames_close(
            &collect(w.min()),
            &naive_window(&frame, len, min_len, ref_min),
            1e-6,
        );
        assert_frames_close(
            &collect(w.max()),
            &naive_window(&frame, len, min_len, ref_max),
            1e-6,
        );
        assert_frames_close(
            &collect(w.median()),
            &naive_window(&frame, len, min_len, ref_median),
            1e-5,
        );
    }
}

#[test]
fn shift_round_trip_agrees_on_inner_rows() {
    let mut frame = uniform(30, 3, 33);
    let mut values = frame.values().to_vec();
    for v in values.iter_mut().take(3) {
        *v = NAN;
    }
    frame = frame.with_values(values);
    let m = Matrix::new(frame);

    let once = collect(m.shift(1));
    let there_and_back = collect(m.shift(1).shift(1).shift(-1));
    for r in 1..29 {
        for c in 0..3 {
            let a = once.get(r, c);
            let b = there_and_back.get(r, c);
            assert!((a.is_nan() && b.is_nan()) || a == b, "row {r} col {c}");
        }
    }
}

#[test]
fn addition_is_associative_within_float_error() {
    let a = Matrix::new(uniform(40, 4, 51));
    let b = Matrix::new(uniform(40, 4, 52));
    let c = Matrix::new(uniform(40, 4, 53));
    let left = collect(a.add(&b).unwrap().add(&c).unwrap());
    let right = collect(a.add(&b.add(&c).unwrap()).unwrap());
    assert_frames_close(&left, &right, 1e-5);
}

#[test]
fn expanding_equals_full_length_rolling() {
    let m = market(60, 3);
    let expanding = collect(m.expanding(10).unwrap().stdev());
    let rolling = collect(m.window(60, 10).unwrap().stdev());
    assert_eq!(expanding.values(), rolling.values());
}

#[test]
fn normalize_signal_is_clipped() {
    let m = Matrix::new(sprinkle_nans(uniform(300, 3, 61), 0.02, 62));
    let out = collect(m.normalize_signal().unwrap());
    for &v in out.values() {
        if v.is_nan() {
            continue;
        }
        assert!((-2.0..=2.0).contains(&v));
    }
}

#[test]
fn vol_target_pipeline_runs_end_to_end() {
    let base = uniform(120, 4, 71);
    let scaled = base.with_values(base.values().iter().map(|v| v * 0.01).collect());
    let returns = Matrix::new(sprinkle_nans(scaled, 0.03, 72));
    let adjusted = collect(returns.pct_to_adjusted_pct().unwrap());
    assert_eq!(adjusted.shape(), (120, 4));
    // Row 0 carries no leverage estimate yet.
    assert!(adjusted.row(0).iter().all(|v| v.is_nan()));
}
