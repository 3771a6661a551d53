// =============================================================================
// Price Levels — support/resistance, trend strength, range position
// =============================================================================
//
//   Support / Resistance = min / max close over the trailing lookback window
//   TrendStrength        = last close - close 10 bars earlier
//   RangeIndex           = (last - min) / (max - min) * 100   (whole series)

use serde::Serialize;

pub const DEFAULT_LEVEL_LOOKBACK: usize = 20;

/// Bars needed before trend strength is reported.
pub const TREND_MIN_BARS: usize = 12;
/// Distance, in bars, between the two closes compared by trend strength.
pub const TREND_SPAN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

/// Min/max close over the last `lookback` closes, or over everything
/// available when the series is shorter.
///
/// Returns `None` only for an empty input. `lookback == 0` is treated as 1.
pub fn support_resistance(closes: &[f64], lookback: usize) -> Option<SupportResistance> {
    if closes.is_empty() {
        return None;
    }
    let lookback = lookback.max(1);
    let window = &closes[closes.len().saturating_sub(lookback)..];
    let (support, resistance) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| (lo.min(c), hi.max(c)));
    Some(SupportResistance {
        support,
        resistance,
    })
}

/// Last close minus the close [`TREND_SPAN`] bars before it, i.e.
/// `close[n-1] - close[n-11]`.  A first-to-last over a 10-close window would
/// be `close[n-1] - close[n-10]`; the 12-bar minimum fits the wider reading.
///
/// Returns 0.0 until [`TREND_MIN_BARS`] closes exist.
pub fn trend_strength(closes: &[f64]) -> f64 {
    if closes.len() < TREND_MIN_BARS {
        return 0.0;
    }
    let last = closes[closes.len() - 1];
    let earlier = closes[closes.len() - 1 - TREND_SPAN];
    last - earlier
}

/// Position of the last close inside the full-series range, in percent.
///
/// Returns `None` for an empty series or a flat one (`max == min`).
pub fn range_index(closes: &[f64]) -> Option<f64> {
    let &last = closes.last()?;
    let (low, high) = closes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| (lo.min(c), hi.max(c)));
    let span = high - low;
    if span <= 0.0 || !span.is_finite() {
        return None;
    }
    Some(((last - low) / span * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- support_resistance ----------------------------------------------

    #[test]
    fn levels_use_trailing_window() {
        let mut closes = vec![1.0, 500.0];
        closes.extend((0..20).map(|i| 100.0 + i as f64));
        let sr = support_resistance(&closes, 20).unwrap();
        assert_eq!(sr.support, 100.0);
        assert_eq!(sr.resistance, 119.0);
    }

    #[test]
    fn levels_short_series_uses_everything() {
        let sr = support_resistance(&[5.0, 3.0, 9.0], 20).unwrap();
        assert_eq!(sr.support, 3.0);
        assert_eq!(sr.resistance, 9.0);
        assert!(support_resistance(&[], 20).is_none());
    }

    // ---- trend_strength --------------------------------------------------

    #[test]
    fn trend_needs_twelve_bars() {
        let closes: Vec<f64> = (0..11).map(|i| i as f64).collect();
        assert_eq!(trend_strength(&closes), 0.0);
    }

    #[test]
    fn trend_compares_ten_bars_back() {
        let closes: Vec<f64> = (0..12).map(|i| (i * i) as f64).collect();
        // last = 121, ten bars earlier (index 1) = 1
        assert_eq!(trend_strength(&closes), 120.0);
    }

    // ---- range_index -----------------------------------------------------

    #[test]
    fn range_index_bounds() {
        assert_eq!(range_index(&[5.0, 9.0, 7.0, 1.0]), Some(0.0));
        assert_eq!(range_index(&[5.0, 1.0, 7.0, 9.0]), Some(100.0));
        assert_eq!(range_index(&[0.0, 10.0, 5.0]), Some(50.0));
    }

    #[test]
    fn range_index_flat_or_empty_is_none() {
        assert!(range_index(&[4.0; 10]).is_none());
        assert!(range_index(&[]).is_none());
    }
}
