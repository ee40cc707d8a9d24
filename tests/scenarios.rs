//! End-to-end scenarios with literal inputs and pinned expected outputs.

use qm_test::{assert_close, ramp};
use quantmat::prelude::*;

fn collect(m: Matrix) -> Frame {
    m.collect().unwrap().frame().unwrap().clone()
}

#[test]
fn moving_mean_pair_of_columns() {
    let m = Matrix::from_rows(vec![
        vec![1.0, 2.0],
        vec![3.0, 4.0],
        vec![5.0, 6.0],
        vec![7.0, 8.0],
    ])
    .unwrap();
    let out = collect(m.rolling(2).unwrap().mean());
    assert!(out.row(0).iter().all(|v| v.is_nan()));
    assert_eq!(out.row(1), &[2.0, 3.0]);
    assert_eq!(out.row(2), &[4.0, 5.0]);
    assert_eq!(out.row(3), &[6.0, 7.0]);
}

#[test]
fn skew_of_a_constant_column() {
    let m = Matrix::from_rows(vec![vec![2.0]; 6]).unwrap();
    let out = collect(m.window(5, 3).unwrap().skew());
    assert!(out.get(0, 0).is_nan());
    assert!(out.get(1, 0).is_nan());
    for r in 2..6 {
        assert_eq!(out.get(r, 0), 0.0);
    }
}

#[test]
fn equity_to_pct_returns() {
    let m = Matrix::from_rows(vec![vec![100.0], vec![110.0], vec![99.0]]).unwrap();
    let out = collect(m.convert().equity_to_pct());
    assert!(out.get(0, 0).is_nan());
    assert_close(&[out.get(1, 0), out.get(2, 0)], &[0.1, -0.1], 1e-6);
}

#[test]
fn cross_rank_row() {
    let m = Matrix::from_rows(vec![vec![1.0, NAN, 3.0, 2.0]]).unwrap();
    let out = collect(m.cross_rank());
    assert_eq!(out.get(0, 0), -1.0);
    assert!(out.get(0, 1).is_nan());
    assert_eq!(out.get(0, 2), 1.0);
    assert_eq!(out.get(0, 3), 0.0);
}

#[test]
fn backfill_column() {
    let m = Matrix::from_rows(vec![
        vec![NAN],
        vec![NAN],
        vec![5.0],
        vec![NAN],
        vec![7.0],
        vec![NAN],
    ])
    .unwrap();
    let out = collect(m.backfill());
    assert_eq!(
        &out.values()[..5],
        &[5.0, 5.0, 5.0, 7.0, 7.0]
    );
    assert!(out.get(5, 0).is_nan());
}

#[test]
fn z_score_of_a_ramp_plateaus() {
    let m = Matrix::new(ramp(100));
    let out = collect(m.z_score(10).unwrap());
    // For a linear ramp the z-score settles at (L-1) * sqrt(3 / (L (L+1))):
    // ~1.48626 for L = 10.
    let plateau = out.get(9, 0);
    assert!((plateau - 1.48626).abs() < 1e-4, "plateau {plateau}");
    for r in 9..100 {
        assert!(
            (out.get(r, 0) - plateau).abs() < 1e-5,
            "row {r} drifted: {} vs {plateau}",
            out.get(r, 0)
        );
    }
}

#[test]
fn quantile_brackets_the_median() {
    let m = Matrix::from_rows(vec![
        vec![1.0],
        vec![9.0],
        vec![4.0],
        vec![6.0],
        vec![2.0],
    ])
    .unwrap();
    let med = collect(m.window(5, 5).unwrap().median());
    let q25 = collect(m.window(5, 5).unwrap().quantile(0.25));
    let q75 = collect(m.window(5, 5).unwrap().quantile(0.75));
    assert_eq!(med.get(4, 0), 4.0);
    assert_eq!(q25.get(4, 0), 2.0);
    assert_eq!(q75.get(4, 0), 6.0);
}

#[test]
fn lazy_access_errors_until_collect() {
    let m = Matrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
    let lazy = m.abs();
    assert_eq!(lazy.values().unwrap_err(), Error::Lazy);
    assert!(lazy.collect().unwrap().values().is_ok());
}

#[test]
fn builder_validation_errors() {
    let m = Matrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
    assert!(matches!(m.rolling(3), Err(Error::BadWindow { .. })));
    let wide = Matrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
    assert!(matches!(m.add(&wide), Err(Error::ShapeMismatch { .. })));
    assert_eq!(Matrix::from_rows(vec![]).unwrap_err(), Error::Empty);
}

#[test]
fn division_by_zero_is_not_an_error() {
    let m = Matrix::from_rows(vec![vec![1.0, 0.0]]).unwrap();
    let out = collect(m.target_scalar(1.0));
    assert_eq!(out.get(0, 0), 1.0);
    assert_eq!(out.get(0, 1), V::INFINITY);
}
