// =============================================================================
// Bollinger Bands
// =============================================================================
//
//   mid   = SMA(p)
//   upper = mid + mult * Volatility(p)
//   lower = mid - mult * Volatility(p)
//
// Built directly on `calculate_sma` and `calculate_volatility`, so the bands
// always agree with the `ma*` and `volatility` features.
// =============================================================================

use serde::Serialize;

use super::sma::{calculate_sma, calculate_volatility};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
}

/// Bands over the last `period` closes.
///
/// # Edge cases
/// - `period == 0` or fewer than `period` closes => `None`
/// - negative or non-finite `mult` => `None` (the bands would cross)
pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> Option<BollingerResult> {
    if period == 0 || closes.len() < period || !mult.is_finite() || mult < 0.0 {
        return None;
    }

    let mid = calculate_sma(closes, period);
    let spread = mult * calculate_volatility(closes, period);

    Some(BollingerResult {
        upper: mid + spread,
        mid,
        lower: mid - spread,
    })
}
