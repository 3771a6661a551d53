// =============================================================================
// TickPulse — intraday indicator, signal and forecast pipeline
// =============================================================================
//
// Core (pure, no I/O):
//   market_data  -> validated price series and synthetic session paths
//   indicators   -> SMA, EMA, RSI, ATR, VWAP, Bollinger, MACD, levels
//   features     -> the fifteen-field feature vector
//   model        -> linear next-bar forecast
//   signals      -> rule-based BUY / SELL / NEUTRAL classifier
//   pipeline     -> one refresh for one instrument
//
// Daemon:
//   quote_source, refresh, app_state, api, runtime_config
// =============================================================================

pub mod api;
pub mod app_state;
pub mod features;
pub mod indicators;
pub mod market_data;
pub mod model;
pub mod pipeline;
pub mod quote_source;
pub mod refresh;
pub mod runtime_config;
pub mod signals;
pub mod types;
