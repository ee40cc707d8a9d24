//! Sliding-window kernels.
//!
//! For each column independently, `out[r]` is the statistic over the
//! trailing window `[max(0, r - len + 1), r]` restricted to non-NaN
//! entries. A value enters its accumulators at row `r` and leaves once the
//! window is full (`r >= len`, removing row `r - len`); the statistic is
//! emitted only while the non-NaN count reaches `min_len`.

use std::collections::VecDeque;

use qm_types::{Frame, NAN, V};

use crate::accum::{M1, M2, M3, M4};
use crate::order::SlidingOrder;
use crate::par::map_columns;
use crate::stats;

/// Incremental state for one moment-based statistic.
///
/// `add`/`remove` mirror the accumulator contract (NaN is a no-op); `emit`
/// is only called under the `count >= min_len` guard.
trait WindowState: Default {
    fn add(&mut self, v: V);
    fn remove(&mut self, v: V);
    fn emit(&self, n: usize) -> V;
}

fn roll<S: WindowState>(col: &[V], len: usize, min_len: usize, out: &mut [V]) {
    let mut state = S::default();
    let mut count = 0usize;
    for (r, &v) in col.iter().enumerate() {
        if !v.is_nan() {
            count += 1;
            state.add(v);
        }
        if r >= len {
            let old = col[r - len];
            if !old.is_nan() {
                count -= 1;
                state.remove(old);
            }
        }
        if count >= min_len {
            out[r] = state.emit(count);
        }
    }
}

fn check_params(frame: &Frame, len: usize, min_len: usize) {
    assert!(len >= 1 && min_len >= 1, "window lengths start at 1");
    assert!(min_len <= len, "min_len must not exceed len");
    assert!(len <= frame.rows(), "window longer than the column");
}

#[derive(Default)]
struct MeanState(M1);

impl WindowState for MeanState {
    fn add(&mut self, v: V) {
        self.0.add(v);
    }
    fn remove(&mut self, v: V) {
        self.0.remove(v);
    }
    fn emit(&self, n: usize) -> V {
        stats::mean(self.0.s1.value(), n) as V
    }
}

#[derive(Default)]
struct SumState(M1);

impl WindowState for SumState {
    fn add(&mut self, v: V) {
        self.0.add(v);
    }
    fn remove(&mut self, v: V) {
        self.0.remove(v);
    }
    fn emit(&self, _n: usize) -> V {
        self.0.s1.value() as V
    }
}

#[derive(Default)]
struct VarState(M2);

impl WindowState for VarState {
    fn add(&mut self, v: V) {
        self.0.add(v);
    }
    fn remove(&mut self, v: V) {
        self.0.remove(v);
    }
    fn emit(&self, n: usize) -> V {
        if n < 2 {
            return NAN;
        }
        stats::sample_var(self.0.s1.value(), self.0.s2.value(), n) as V
    }
}

#[derive(Default)]
struct StdevState(M2);

impl WindowState for StdevState {
    fn add(&mut self, v: V) {
        self.0.add(v);
    }
    fn remove(&mut self, v: V) {
        self.0.remove(v);
    }
    fn emit(&self, n: usize) -> V {
        if n < 2 {
            return NAN;
        }
        let var = stats::sample_var(self.0.s1.value(), self.0.s2.value(), n);
        if var >= 0.0 {
            var.sqrt() as V
        } else {
            NAN
        }
    }
}

/// Tracks the run of consecutive equal non-NaN values alongside the sums;
/// a run at least as long as the window's count means every resident is
/// equal, which short-circuits the higher-moment formulas.
struct SkewState {
    m: M3,
    run: usize,
    prev: V,
}

impl Default for SkewState {
    fn default() -> Self {
        SkewState {
            m: M3::default(),
            run: 0,
            prev: NAN,
        }
    }
}

impl WindowState for SkewState {
    fn add(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        self.m.add(v);
        if v == self.prev {
            self.run += 1;
        } else {
            self.run = 1;
            self.prev = v;
        }
    }
    fn remove(&mut self, v: V) {
        self.m.remove(v);
    }
    fn emit(&self, n: usize) -> V {
        stats::sample_skew(
            self.m.s1.value(),
            self.m.s2.value(),
            self.m.s3.value(),
            n,
            self.run >= n,
        ) as V
    }
}

struct KurtState {
    m: M4,
    run: usize,
    prev: V,
}

impl Default for KurtState {
    fn default() -> Self {
        KurtState {
            m: M4::default(),
            run: 0,
            prev: NAN,
        }
    }
}

impl WindowState for KurtState {
    fn add(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        self.m.add(v);
        if v == self.prev {
            self.run += 1;
        } else {
            self.run = 1;
            self.prev = v;
        }
    }
    fn remove(&mut self, v: V) {
        self.m.remove(v);
    }
    fn emit(&self, n: usize) -> V {
        stats::excess_kurt(
            self.m.s1.value(),
            self.m.s2.value(),
            self.m.s3.value(),
            self.m.s4.value(),
            n,
            self.run >= n,
        ) as V
    }
}

pub fn move_mean(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| roll::<MeanState>(col, len, min_len, out))
}

pub fn move_sum(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| roll::<SumState>(col, len, min_len, out))
}

/// Sample variance, ddof = 1; windows with fewer than two observations
/// emit NaN.
pub fn move_var(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| roll::<VarState>(col, len, min_len, out))
}

pub fn move_stdev(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| roll::<StdevState>(col, len, min_len, out))
}

/// Bias-corrected sample skewness; an all-equal window emits 0.
pub fn move_skew(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| roll::<SkewState>(col, len, min_len, out))
}

/// Bias-corrected excess kurtosis; an all-equal window emits -3.
pub fn move_kurt(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| roll::<KurtState>(col, len, min_len, out))
}

/// Monotonic deque of candidate indices: stale entries fall off the front,
/// dominated entries off the back, so the front is always the extremum of
/// the live window.
fn roll_extremum<const MIN: bool>(col: &[V], len: usize, min_len: usize, out: &mut [V]) {
    let mut deque: VecDeque<usize> = VecDeque::new();
    let mut count = 0usize;
    for (r, &v) in col.iter().enumerate() {
        if !v.is_nan() {
            count += 1;
            while let Some(&back) = deque.back() {
                let dominated = if MIN { col[back] > v } else { col[back] < v };
                if !dominated {
                    break;
                }
                deque.pop_back();
            }
            deque.push_back(r);
        }
        if r >= len && !col[r - len].is_nan() {
            count -= 1;
        }
        let start = (r + 1).saturating_sub(len);
        while deque.front().is_some_and(|&front| front < start) {
            deque.pop_front();
        }
        if count >= min_len {
            if let Some(&front) = deque.front() {
                out[r] = col[front];
            }
        }
    }
}

pub fn move_min(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| {
        roll_extremum::<true>(col, len, min_len, out)
    })
}

pub fn move_max(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| {
        roll_extremum::<false>(col, len, min_len, out)
    })
}

fn roll_quantile(col: &[V], len: usize, min_len: usize, q: f64, out: &mut [V]) {
    let mut set = SlidingOrder::with_capacity(len);
    let mut count = 0usize;
    for (r, &v) in col.iter().enumerate() {
        if !v.is_nan() {
            count += 1;
            set.insert(v);
        }
        if r >= len {
            let old = col[r - len];
            if !old.is_nan() {
                count -= 1;
                set.remove(old);
            }
        }
        if count >= min_len {
            out[r] = set.quantile(q);
        }
    }
}

pub fn move_median(frame: &Frame, len: usize, min_len: usize) -> Frame {
    move_quantile(frame, len, min_len, 0.5)
}

/// Moving quantile with linear interpolation, q in (0, 1).
pub fn move_quantile(frame: &Frame, len: usize, min_len: usize, q: V) -> Frame {
    check_params(frame, len, min_len);
    assert!((0.0..=1.0).contains(&q), "quantile outside [0, 1]");
    let q = q as f64;
    map_columns(frame, |col, out| roll_quantile(col, len, min_len, q, out))
}

/// Trailing rank of the current element among the window's non-NaN values,
/// normalized to [0, 1]. Rows whose own value is NaN, or whose window holds
/// fewer than two observations, emit NaN.
pub fn move_rank(frame: &Frame, len: usize, min_len: usize) -> Frame {
    check_params(frame, len, min_len);
    map_columns(frame, |col, out| {
        let mut set = SlidingOrder::with_capacity(len);
        let mut count = 0usize;
        for (r, &v) in col.iter().enumerate() {
            if !v.is_nan() {
                count += 1;
                set.insert(v);
            }
            if r >= len {
                let old = col[r - len];
                if !old.is_nan() {
                    count -= 1;
                    set.remove(old);
                }
            }
            if count >= min_len && !v.is_nan() {
                out[r] = set.rank_of_newest(v);
            }
        }
    })
}
