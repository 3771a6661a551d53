// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   k     = 2 / (period + 1)
//   EMA_0 = close_0
//   EMA_t = close_t * k + EMA_{t-1} * (1 - k)
//
// The recursion is seeded with the very first close of the whole history and
// blended across every close, so the result depends on the full series and on
// its order, not only on the trailing window.  No rounding happens inside the
// recursion.
// =============================================================================

/// Full EMA path: one value per input close, seeded with `values[0]`.
///
/// Returns an empty `Vec` for empty input or `period == 0`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&seed) = values.first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev = seed;
    result.push(prev);
    for &v in &values[1..] {
        prev = v * k + prev * (1.0 - k);
        result.push(prev);
    }
    result
}

/// Latest EMA value over the whole history.
///
/// # Edge cases
/// - `period == 0` => 0.0
/// - `closes.len() < period` => 0.0 (the sentinel for "not yet meaningful")
pub fn calculate_ema(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period {
        return 0.0;
    }
    ema_series(closes, period).last().copied().unwrap_or(0.0)
}
