// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the feature
// extractor.  None of them fail on short input: scalar indicators return a
// documented sentinel (0.0, or 50.0 for RSI) and indicators that can be
// genuinely undefined return `Option<T>`.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod vwap;

pub use atr::calculate_atr;
pub use bollinger::{calculate_bollinger, BollingerResult};
pub use ema::{calculate_ema, ema_series};
pub use levels::{range_index, support_resistance, trend_strength, SupportResistance};
pub use macd::{calculate_macd, MacdResult};
pub use rsi::{calculate_rsi, rsi_zone};
pub use sma::{calculate_sma, calculate_volatility};
pub use vwap::calculate_vwap;
