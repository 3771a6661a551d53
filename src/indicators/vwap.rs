// =============================================================================
// Volume-Weighted Average Price (VWAP)
// =============================================================================
//
//   VWAP = Σ(close × volume) / Σ(volume)   over the whole series
//
// Bars without a volume use a fixed substitute so the result stays
// reproducible from refresh to refresh.
// =============================================================================

use crate::types::Bar;

/// Default volume assigned to bars that carry none.
pub const DEFAULT_SUBSTITUTE_VOLUME: f64 = 500.0;

/// VWAP over every bar in `bars`.
///
/// Returns `None` for an empty series, when the total volume is zero, or when
/// the result is non-finite.
pub fn calculate_vwap(bars: &[Bar], substitute_volume: f64) -> Option<f64> {
    if bars.is_empty() {
        return None;
    }

    let (pv, vol) = bars.iter().fold((0.0_f64, 0.0_f64), |(pv, vol), bar| {
        let volume = bar.volume.unwrap_or(substitute_volume);
        (pv + bar.close * volume, vol + volume)
    });

    if vol <= 0.0 {
        return None;
    }
    let vwap = pv / vol;
    vwap.is_finite().then_some(vwap)
}
