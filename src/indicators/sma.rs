// =============================================================================
// Simple Moving Average (SMA) and Rolling Volatility
// =============================================================================
//
//   SMA(p)        = mean of the last p closes
//   Volatility(w) = population standard deviation of the last w closes
//
// Both fall back to 0.0 when fewer than the required closes are available.
// =============================================================================

/// Mean of the last `period` closes.
///
/// # Edge cases
/// - `period == 0` => 0.0
/// - `closes.len() < period` => 0.0 (not yet meaningful, not a real zero)
pub fn calculate_sma(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period {
        return 0.0;
    }
    let window = &closes[closes.len() - period..];
    window.iter().sum::<f64>() / period as f64
}

/// Population standard deviation of the last `window` closes.
///
/// Returns 0.0 when `window == 0` or fewer than `window` closes exist.
pub fn calculate_volatility(closes: &[f64], window: usize) -> f64 {
    if window == 0 || closes.len() < window {
        return 0.0;
    }
    let slice = &closes[closes.len() - window..];
    let mean = slice.iter().sum::<f64>() / window as f64;
    let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
    variance.sqrt()
}
