//! Rayon scheduling helpers.
//!
//! Column-independent kernels gather each (strided) column into a
//! contiguous scratch vector, run sequentially within it, and scatter the
//! results back; one rayon task per column. Row-independent kernels write
//! straight into disjoint row chunks of the output buffer.

use rayon::prelude::*;

use qm_types::{Frame, NAN, V};

/// Run `f(column, out)` once per column, in parallel. `out` starts all-NaN.
pub fn map_columns<F>(frame: &Frame, f: F) -> Frame
where
    F: Fn(&[V], &mut [V]) + Sync,
{
    let (rows, cols) = frame.shape();
    let computed: Vec<Vec<V>> = (0..cols)
        .into_par_iter()
        .map(|c| {
            let col = frame.column(c);
            let mut out = vec![NAN; rows];
            f(&col, &mut out);
            out
        })
        .collect();

    let mut values = vec![NAN; rows * cols];
    for (c, col) in computed.iter().enumerate() {
        for (r, &v) in col.iter().enumerate() {
            values[r * cols + c] = v;
        }
    }
    frame.with_values(values)
}

/// Run `f(row, out)` once per row, in parallel over contiguous row slices.
/// `out` starts all-NaN.
pub fn map_rows<F>(frame: &Frame, f: F) -> Frame
where
    F: Fn(&[V], &mut [V]) + Sync,
{
    let (rows, cols) = frame.shape();
    let mut values = vec![NAN; rows * cols];
    values
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(r, out)| f(frame.row(r), out));
    frame.with_values(values)
}

/// Elementwise map over the whole buffer.
pub fn map_values<F>(frame: &Frame, f: F) -> Frame
where
    F: Fn(V) -> V + Sync,
{
    let mut values = frame.values().to_vec();
    values.par_iter_mut().for_each(|v| *v = f(*v));
    frame.with_values(values)
}

/// Reduce every column to one value: shape `(1, cols)`.
pub fn fold_columns<F>(frame: &Frame, f: F) -> Frame
where
    F: Fn(&[V]) -> V + Sync,
{
    let cols = frame.cols();
    let values: Vec<V> = (0..cols)
        .into_par_iter()
        .map(|c| f(&frame.column(c)))
        .collect();
    frame.reduce_rows(values)
}

/// Reduce every row to one value: shape `(rows, 1)`.
pub fn fold_rows<F>(frame: &Frame, f: F) -> Frame
where
    F: Fn(&[V]) -> V + Sync,
{
    let rows = frame.rows();
    let values: Vec<V> = (0..rows).into_par_iter().map(|r| f(frame.row(r))).collect();
    frame.reduce_cols(values)
}
