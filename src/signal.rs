//! Derived signal operations composed from the primitive builders.

use qm_types::{Result, V};

use crate::config::{PERCENT, VOL_TARGET};
use crate::matrix::Matrix;

const COMPOSITE_SHORT_WEIGHT: V = 0.6;
const COMPOSITE_LEN: usize = 30;
const SIGNAL_MEDIAN_LEN: usize = 252;
const SIGNAL_CLIP: V = 2.0;

impl Matrix {
    /// `x - rolling(len).mean(x)`.
    pub fn mean_diff(&self, len: usize) -> Result<Matrix> {
        self.sub(&self.rolling(len)?.mean())
    }

    /// `x - rolling(len).median(x)`.
    pub fn median_diff(&self, len: usize) -> Result<Matrix> {
        self.sub(&self.rolling(len)?.median())
    }

    /// Rolling z-score: `mean_diff(len) / rolling(len).stdev(x)`.
    pub fn z_score(&self, len: usize) -> Result<Matrix> {
        self.mean_diff(len)?.div(&self.rolling(len)?.stdev())
    }

    /// Midpoint of the rolling range.
    pub fn midrange(&self, len: usize) -> Result<Matrix> {
        let summed = self.rolling(len)?.max().add(&self.rolling(len)?.min())?;
        Ok(summed.div_scalar(2.0))
    }

    /// Median offset scaled by the rolling range into roughly [-1, +1].
    pub fn normalize(&self, len: usize) -> Result<Matrix> {
        let range = self.rolling(len)?.max().sub(&self.rolling(len)?.min())?;
        Ok(self.median_diff(len)?.div(&range)?.mul_scalar(2.0))
    }

    /// Scale by the inverse expanding median of `|x|`, then clip to +-2.
    pub fn normalize_signal(&self) -> Result<Matrix> {
        let median_row = self
            .abs()
            .expanding(SIGNAL_MEDIAN_LEN)?
            .median()
            .target_scalar(1.0)
            .backfill();
        Ok(self.mul(&median_row)?.clip(SIGNAL_CLIP))
    }

    /// Percent scaling.
    pub fn annualize(&self) -> Matrix {
        self.mul_scalar(PERCENT)
    }

    /// Blend of short rolling and expanding stdev, in percent, with NaN
    /// gaps patched by the column median.
    pub fn stdev_composite(&self) -> Result<Matrix> {
        let short = self
            .rolling(COMPOSITE_LEN)?
            .stdev()
            .mul_scalar(COMPOSITE_SHORT_WEIGHT);
        let long = self
            .expanding(COMPOSITE_LEN)?
            .stdev()
            .mul_scalar(1.0 - COMPOSITE_SHORT_WEIGHT);
        Ok(short.add(&long)?.annualize().fill_by_median())
    }

    /// Leverage that scales the composite volatility to [`VOL_TARGET`].
    pub fn vol_target(&self) -> Result<Matrix> {
        Ok(self.stdev_composite()?.target_scalar(VOL_TARGET))
    }

    /// Volatility-adjust a return stream by yesterday's target leverage.
    pub fn pct_to_adjusted_pct(&self) -> Result<Matrix> {
        self.mul(&self.vol_target()?.shift(1))
    }

    /// Yesterday's signal applied to today's returns.
    pub fn backtest(&self, returns: &Matrix) -> Result<Matrix> {
        self.shift(1).mul(returns)
    }
}
