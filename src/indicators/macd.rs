// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   line      = EMA(fast) - EMA(slow)          (both full-history EMAs)
//   signal    = EMA(signal_period) of the MACD line
//   histogram = line - signal
//
// The line is taken from the bar where the slow EMA first has a full window
// onward; the signal EMA is seeded with the first of those line values.
// =============================================================================

use serde::Serialize;

use crate::indicators::ema::ema_series;

pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdResult {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Latest MACD reading.
///
/// Returns `None` when:
/// - Any period is zero or `fast >= slow`.
/// - Fewer than `slow` closes.
/// - The result is non-finite.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdResult> {
    if fast == 0 || slow == 0 || signal_period == 0 || fast >= slow {
        return None;
    }
    if closes.len() < slow {
        return None;
    }

    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);
    let line_series: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .skip(slow - 1)
        .map(|(f, s)| f - s)
        .collect();

    let line = *line_series.last()?;
    let signal = *ema_series(&line_series, signal_period).last()?;
    let histogram = line - signal;

    if line.is_finite() && signal.is_finite() {
        Some(MacdResult {
            line,
            signal,
            histogram,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ema::calculate_ema;

    #[test]
    fn macd_short_or_bad_periods() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        assert!(calculate_macd(&closes, 12, 26, 9).is_none());
        assert!(calculate_macd(&closes, 0, 26, 9).is_none());
        assert!(calculate_macd(&closes, 26, 12, 9).is_none());
        assert!(calculate_macd(&closes, 5, 10, 0).is_none());
    }

    #[test]
    fn macd_line_is_ema_difference() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        let m = calculate_macd(&closes, 12, 26, 9).unwrap();
        let expected = calculate_ema(&closes, 12) - calculate_ema(&closes, 26);
        assert!((m.line - expected).abs() < 1e-10);
        assert!((m.histogram - (m.line - m.signal)).abs() < 1e-12);
    }

    #[test]
    fn macd_signal_is_smoothed_not_copied() {
        // A trend that reverses: the signal lags the line, histogram is non-zero.
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..20).map(|i| 140.0 - i as f64 * 2.0));
        let m = calculate_macd(&closes, 12, 26, 9).unwrap();
        assert!(m.histogram.abs() > 1e-6);
        assert!(m.line < m.signal, "falling leg should put the line below signal");
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let m = calculate_macd(&[50.0; 40], 12, 26, 9).unwrap();
        assert!(m.line.abs() < 1e-10);
        assert!(m.signal.abs() < 1e-10);
        assert!(m.histogram.abs() < 1e-10);
    }
}
