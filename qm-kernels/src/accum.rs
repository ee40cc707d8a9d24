//! Compensated running sums for the moments a statistic needs.
//!
//! Each accumulator keeps one Kahan-compensated sum per maintained power of
//! the input, so the rounding error stays O(eps) regardless of how many
//! values have flowed through the window. Sums are carried in f64 even when
//! the matrix dtype is f32; kernels cast the final statistic back.
//!
//! Accumulators are single-column local and never shared across threads.

use qm_types::V;

/// One compensated sum: `y = term - c; t = s + y; c = (t - s) - y; s = t`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Kahan {
    sum: f64,
    comp: f64,
}

impl Kahan {
    #[inline]
    pub fn add(&mut self, term: f64) {
        let y = term - self.comp;
        let t = self.sum + y;
        self.comp = (t - self.sum) - y;
        self.sum = t;
    }

    #[inline]
    pub fn remove(&mut self, term: f64) {
        self.add(-term);
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    pub fn reset(&mut self) {
        *self = Kahan::default();
    }
}

/// First moment only (mean, sum).
#[derive(Debug, Default, Clone, Copy)]
pub struct M1 {
    pub s1: Kahan,
}

impl M1 {
    /// NaN contributions are a no-op.
    #[inline]
    pub fn add(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        self.s1.add(v as f64);
    }

    #[inline]
    pub fn remove(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        self.s1.remove(v as f64);
    }

    pub fn reset(&mut self) {
        self.s1.reset();
    }
}

/// Moments 1-2 (variance, standard deviation).
#[derive(Debug, Default, Clone, Copy)]
pub struct M2 {
    pub s1: Kahan,
    pub s2: Kahan,
}

impl M2 {
    #[inline]
    pub fn add(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        let x = v as f64;
        self.s1.add(x);
        self.s2.add(x * x);
    }

    #[inline]
    pub fn remove(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        let x = v as f64;
        self.s1.remove(x);
        self.s2.remove(x * x);
    }

    pub fn reset(&mut self) {
        self.s1.reset();
        self.s2.reset();
    }
}

/// Moments 1-3 (skewness).
#[derive(Debug, Default, Clone, Copy)]
pub struct M3 {
    pub s1: Kahan,
    pub s2: Kahan,
    pub s3: Kahan,
}

impl M3 {
    #[inline]
    pub fn add(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        let x = v as f64;
        self.s1.add(x);
        self.s2.add(x * x);
        self.s3.add(x * x * x);
    }

    #[inline]
    pub fn remove(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        let x = v as f64;
        self.s1.remove(x);
        self.s2.remove(x * x);
        self.s3.remove(x * x * x);
    }

    pub fn reset(&mut self) {
        self.s1.reset();
        self.s2.reset();
        self.s3.reset();
    }
}

/// Moments 1-4 (kurtosis).
#[derive(Debug, Default, Clone, Copy)]
pub struct M4 {
    pub s1: Kahan,
    pub s2: Kahan,
    pub s3: Kahan,
    pub s4: Kahan,
}

impl M4 {
    #[inline]
    pub fn add(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        let x = v as f64;
        let x2 = x * x;
        self.s1.add(x);
        self.s2.add(x2);
        self.s3.add(x2 * x);
        self.s4.add(x2 * x2);
    }

    #[inline]
    pub fn remove(&mut self, v: V) {
        if v.is_nan() {
            return;
        }
        let x = v as f64;
        let x2 = x * x;
        self.s1.remove(x);
        self.s2.remove(x2);
        self.s3.remove(x2 * x);
        self.s4.remove(x2 * x2);
    }

    pub fn reset(&mut self) {
        self.s1.reset();
        self.s2.reset();
        self.s3.reset();
        self.s4.reset();
    }
}
