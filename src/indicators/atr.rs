// =============================================================================
// Average True Range (ATR) — simple average of trailing true ranges
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the arithmetic mean of the last `period` TR values.
//
// Close-only bars carry no high/low, so a fixed band around the close is
// synthesized:  H = close + δ,  L = close - δ.
//
// Default period: 14
// =============================================================================

use crate::types::Bar;

/// Half-width of the synthesized high/low band for close-only bars.
pub const SYNTHETIC_RANGE_DELTA: f64 = 1.25;

pub const DEFAULT_ATR_PERIOD: usize = 14;

/// High and low for a bar, synthesized from the close when either is missing.
fn high_low(bar: &Bar) -> (f64, f64) {
    match (bar.high, bar.low) {
        (Some(h), Some(l)) => (h, l),
        _ => (
            bar.close + SYNTHETIC_RANGE_DELTA,
            bar.close - SYNTHETIC_RANGE_DELTA,
        ),
    }
}

/// True range of `bar` against the previous close.
pub fn true_range(bar: &Bar, prev_close: f64) -> f64 {
    let (high, low) = high_low(bar);
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Mean true range over the last `period` bars (oldest first input).
///
/// # Returns
/// 0.0 when:
/// - `period` is zero.
/// - There are fewer than `period + 1` bars (each TR needs a previous close).
/// - The result is non-finite.
pub fn calculate_atr(bars: &[Bar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 0.0;
    }

    let tail = &bars[bars.len() - period - 1..];
    let total: f64 = tail
        .windows(2)
        .map(|w| true_range(&w[1], w[0].close))
        .sum();

    let atr = total / period as f64;
    if atr.is_finite() {
        atr
    } else {
        0.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Build a test bar with the given OHLC values.
    fn candle(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: 0,
            close,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            volume: Some(100.0),
        }
    }

    #[test]
    fn atr_period_zero() {
        let bars = vec![candle(100.0, 105.0, 95.0, 102.0); 20];
        assert_eq!(calculate_atr(&bars, 0), 0.0);
    }

    #[test]
    fn atr_insufficient_data() {
        let bars = vec![candle(100.0, 105.0, 95.0, 102.0); 14];
        assert_eq!(calculate_atr(&bars, 14), 0.0);
    }

    #[test]
    fn atr_exact_minimum_data() {
        // period=3, 4 bars give 3 TR values: 5, 6, 6 (H-L dominates).
        let bars = vec![
            candle(100.0, 102.0, 98.0, 101.0),
            candle(101.0, 104.0, 99.0, 103.0),
            candle(103.0, 106.0, 100.0, 105.0),
            candle(105.0, 108.0, 102.0, 107.0),
        ];
        let atr = calculate_atr(&bars, 3);
        assert!((atr - 17.0 / 3.0).abs() < 1e-10, "got {atr}");
    }

    #[test]
    fn atr_true_range_uses_prev_close() {
        // Gap scenario: |H - prevClose| > H - L
        let bars = vec![
            candle(100.0, 105.0, 95.0, 95.0),
            candle(110.0, 115.0, 108.0, 112.0), // |115-95| = 20
            candle(112.0, 118.0, 110.0, 115.0), // max(8, 6, 2) = 8
            candle(115.0, 120.0, 113.0, 118.0), // max(7, 5, 2) = 7
        ];
        let atr = calculate_atr(&bars, 3);
        assert!((atr - 35.0 / 3.0).abs() < 1e-10, "got {atr}");
    }

    #[test]
    fn atr_synthesizes_range_for_close_only_bars() {
        // Flat closes: TR = 2δ every bar.
        let bars: Vec<Bar> = (0..20).map(|i| Bar::new(i, 100.0)).collect();
        let atr = calculate_atr(&bars, 14);
        assert!((atr - 2.0 * SYNTHETIC_RANGE_DELTA).abs() < 1e-10);

        // A 10-point jump dominates the synthesized band.
        let mut jumpy: Vec<Bar> = (0..4).map(|i| Bar::new(i, 100.0)).collect();
        jumpy.push(Bar::new(4, 110.0));
        let atr = calculate_atr(&jumpy, 1);
        assert!((atr - (10.0 + SYNTHETIC_RANGE_DELTA)).abs() < 1e-10);
    }

    #[test]
    fn atr_only_trailing_bars_count() {
        let mut bars = vec![candle(0.0, 500.0, 1.0, 250.0)];
        bars.extend((0..5).map(|_| candle(100.0, 101.0, 99.0, 100.0)));
        // The wild first bar falls outside the 3-bar window.
        assert!((calculate_atr(&bars, 3) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn atr_nan_high_stays_finite() {
        let bars = vec![
            candle(100.0, 105.0, 95.0, 100.0),
            candle(100.0, f64::NAN, 95.0, 100.0),
            candle(100.0, 105.0, 95.0, 100.0),
            candle(100.0, 105.0, 95.0, 100.0),
        ];
        // f64::max skips the NaN operand, so the bad high cannot poison the mean.
        let atr = calculate_atr(&bars, 3);
        assert!(atr.is_finite());
    }
}
