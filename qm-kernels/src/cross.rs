//! Cross-sectional normalized rank.

use qm_types::{Frame, V};

use crate::par::map_rows;

/// Rank each row across its non-NaN columns into [-1, +1].
///
/// Values are sorted ascending (stable, so equal values keep column order)
/// and rank `r` of `k` maps to `r * 2 / (k - 1) - 1`. Rows with fewer than
/// two non-NaN entries emit all NaN.
pub fn cross_rank(frame: &Frame) -> Frame {
    map_rows(frame, |row, out| {
        let mut valid: Vec<(V, usize)> = row
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(c, &v)| (v, c))
            .collect();
        if valid.len() < 2 {
            return;
        }
        valid.sort_by(|a, b| a.0.total_cmp(&b.0));
        let scale = 2.0 / (valid.len() - 1) as f64;
        for (rank, &(_, c)) in valid.iter().enumerate() {
            out[c] = (rank as f64 * scale - 1.0) as V;
        }
    })
}

#[cfg(test)]
mod tests {
    use qm_types::NAN;

    use super::*;

    #[test]
    fn ranks_span_minus_one_to_one() {
        let f = Frame::from_rows(vec![vec![1.0, NAN, 3.0, 2.0]]).unwrap();
        let out = cross_rank(&f);
        assert_eq!(out.get(0, 0), -1.0);
        assert!(out.get(0, 1).is_nan());
        assert_eq!(out.get(0, 2), 1.0);
        assert_eq!(out.get(0, 3), 0.0);
    }

    #[test]
    fn short_rows_are_all_nan() {
        let f = Frame::from_rows(vec![vec![1.0, NAN, NAN]]).unwrap();
        let out = cross_rank(&f);
        assert!(out.row(0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ties_keep_column_order() {
        let f = Frame::from_rows(vec![vec![2.0, 2.0, 1.0]]).unwrap();
        let out = cross_rank(&f);
        // Stable sort: the earlier column takes the lower rank.
        assert_eq!(out.get(0, 2), -1.0);
        assert_eq!(out.get(0, 0), 0.0);
        assert_eq!(out.get(0, 1), 1.0);
    }
}
