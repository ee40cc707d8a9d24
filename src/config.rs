//! Library-wide constants. There is no global mutable state; callers that
//! need a different annualization pass their own factor explicitly.

use qm_types::V;

/// Daily-to-annual volatility scaling (~sqrt of trading days per year).
pub const ANNUAL: V = 16.0;

/// Fraction-to-percent scaling.
pub const PERCENT: V = 100.0;

/// Default annualized volatility target for [`Matrix::vol_target`].
///
/// [`Matrix::vol_target`]: crate::Matrix::vol_target
pub const VOL_TARGET: V = 0.25;
