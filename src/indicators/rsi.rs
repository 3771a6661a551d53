// =============================================================================
// Relative Strength Index (RSI) — trailing-window sums
// =============================================================================
//
// Step 1 — Take the last `period` price deltas.
// Step 2 — Sum the gains and the losses (as positive magnitudes).
// Step 3 — RS  = gains / losses, where a zero loss sum is replaced by 1.0
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

/// Neutral reading returned when there are not enough closes.
pub const RSI_NEUTRAL: f64 = 50.0;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Compute RSI over the last `period` deltas.
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => 50.0
/// - Zero loss sum is substituted with 1.0, so an all-gain window does not
///   divide by zero; the result still lies in [0, 100).
/// - A non-finite result falls back to 50.0.
pub fn calculate_rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let tail = &closes[closes.len() - period - 1..];
    let (gains, losses) = tail.windows(2).fold((0.0_f64, 0.0_f64), |(g, l), w| {
        let d = w[1] - w[0];
        if d >= 0.0 {
            (g + d, l)
        } else {
            (g, l - d)
        }
    });

    let denominator = if losses == 0.0 { 1.0 } else { losses };
    let rs = gains / denominator;
    let rsi = 100.0 - 100.0 / (1.0 + rs);

    if rsi.is_finite() {
        rsi.clamp(0.0, 100.0)
    } else {
        RSI_NEUTRAL
    }
}

/// Human-readable zone for an RSI reading.
pub fn rsi_zone(value: f64) -> &'static str {
    if value > RSI_OVERBOUGHT {
        "OVERBOUGHT"
    } else if value < RSI_OVERSOLD {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    }
}
