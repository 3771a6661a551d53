// =============================================================================
// Feature Extraction — one named snapshot per refresh
// =============================================================================
//
// Assembles the indicator readings and two log-return features into a single
// `FeatureVector`.  The extractor is a pure function of the series and the
// indicator parameters; it never rounds (rounding happens only when the vector
// is prepared for display).
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::{
    atr::DEFAULT_ATR_PERIOD,
    calculate_atr, calculate_ema, calculate_rsi, calculate_sma, calculate_volatility,
    calculate_vwap,
    levels::DEFAULT_LEVEL_LOOKBACK,
    range_index, support_resistance, trend_strength,
    vwap::DEFAULT_SUBSTITUTE_VOLUME,
};
use crate::market_data::Series;
use crate::types::{round2, round_to};

/// Ordered list of feature names, as used in coefficient tables.
pub const FEATURE_NAMES: &[&str] = &[
    "close",
    "ma10",
    "ma50",
    "ema20",
    "ema50",
    "vwap",
    "rsi",
    "atr",
    "trendStrength",
    "rangeIndex",
    "volatility",
    "support",
    "resistance",
    "ret1",
    "ret5",
];

/// Substitute for the range index of a flat series (midpoint of the range).
pub const FLAT_RANGE_INDEX: f64 = 50.0;

fn default_rsi_period() -> usize {
    14
}
fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}
fn default_level_lookback() -> usize {
    DEFAULT_LEVEL_LOOKBACK
}
fn default_volatility_window() -> usize {
    10
}
fn default_bollinger_period() -> usize {
    20
}
fn default_bollinger_mult() -> f64 {
    2.0
}
fn default_macd_fast() -> usize {
    12
}
fn default_macd_slow() -> usize {
    26
}
fn default_macd_signal() -> usize {
    9
}
fn default_substitute_volume() -> f64 {
    DEFAULT_SUBSTITUTE_VOLUME
}

/// Window sizes and multipliers for the indicator engine.
///
/// The moving-average windows (10/50 SMA, 20/50 EMA) are fixed by the feature
/// names and are not configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    #[serde(default = "default_level_lookback")]
    pub level_lookback: usize,
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,
    #[serde(default = "default_bollinger_mult")]
    pub bollinger_mult: f64,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    /// Volume assumed for bars that carry none (VWAP).
    #[serde(default = "default_substitute_volume")]
    pub substitute_volume: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            atr_period: default_atr_period(),
            level_lookback: default_level_lookback(),
            volatility_window: default_volatility_window(),
            bollinger_period: default_bollinger_period(),
            bollinger_mult: default_bollinger_mult(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            substitute_volume: default_substitute_volume(),
        }
    }
}

/// Named numeric snapshot of every indicator for one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub close: f64,
    pub ma10: f64,
    pub ma50: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub vwap: f64,
    pub rsi: f64,
    pub atr: f64,
    pub trend_strength: f64,
    pub range_index: f64,
    pub volatility: f64,
    pub support: f64,
    pub resistance: f64,
    pub ret1: f64,
    pub ret5: f64,
}

impl FeatureVector {
    /// Look a feature up by its external name (see [`FEATURE_NAMES`]).
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "close" => self.close,
            "ma10" => self.ma10,
            "ma50" => self.ma50,
            "ema20" => self.ema20,
            "ema50" => self.ema50,
            "vwap" => self.vwap,
            "rsi" => self.rsi,
            "atr" => self.atr,
            "trendStrength" => self.trend_strength,
            "rangeIndex" => self.range_index,
            "volatility" => self.volatility,
            "support" => self.support,
            "resistance" => self.resistance,
            "ret1" => self.ret1,
            "ret5" => self.ret5,
            _ => return None,
        };
        Some(value)
    }

    /// `(name, value)` pairs in [`FEATURE_NAMES`] order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES
            .iter()
            .filter_map(move |&name| self.get(name).map(|v| (name, v)))
    }

    pub fn is_finite(&self) -> bool {
        self.iter().all(|(_, v)| v.is_finite())
    }

    /// Copy prepared for the output boundary: prices, RSI and range index at
    /// 2 decimals, log-returns and volatility at 4.
    pub fn rounded(&self) -> Self {
        Self {
            close: round2(self.close),
            ma10: round2(self.ma10),
            ma50: round2(self.ma50),
            ema20: round2(self.ema20),
            ema50: round2(self.ema50),
            vwap: round2(self.vwap),
            rsi: round2(self.rsi),
            atr: round2(self.atr),
            trend_strength: round2(self.trend_strength),
            range_index: round2(self.range_index),
            volatility: round_to(self.volatility, 4),
            support: round2(self.support),
            resistance: round2(self.resistance),
            ret1: round_to(self.ret1, 4),
            ret5: round_to(self.ret5, 4),
        }
    }
}

/// `ln(last / closes[len - 1 - lag])`, or 0.0 when the series is too short.
fn log_return(closes: &[f64], lag: usize) -> f64 {
    if closes.len() <= lag {
        return 0.0;
    }
    let last = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - lag];
    let r = (last / base).ln();
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Build the feature vector for `series`.
///
/// Returns `None` only for an empty series; every other shortfall is covered
/// by the indicators' own defaults.
pub fn extract_features(series: &Series, params: &IndicatorParams) -> Option<FeatureVector> {
    let last = series.last()?;
    let closes = series.closes();
    let bars = series.bars();

    let levels = support_resistance(&closes, params.level_lookback)?;

    Some(FeatureVector {
        close: last.close,
        ma10: calculate_sma(&closes, 10),
        ma50: calculate_sma(&closes, 50),
        ema20: calculate_ema(&closes, 20),
        ema50: calculate_ema(&closes, 50),
        vwap: calculate_vwap(bars, params.substitute_volume).unwrap_or(last.close),
        rsi: calculate_rsi(&closes, params.rsi_period),
        atr: calculate_atr(bars, params.atr_period),
        trend_strength: trend_strength(&closes),
        range_index: range_index(&closes).unwrap_or(FLAT_RANGE_INDEX),
        volatility: calculate_volatility(&closes, params.volatility_window),
        support: levels.support,
        resistance: levels.resistance,
        ret1: log_return(&closes, 1),
        ret5: log_return(&closes, 5),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(closes: &[f64]) -> Series {
        Series::from_closes(closes.iter().enumerate().map(|(i, &c)| (i as i64 * 60_000, c)))
    }

    #[test]
    fn empty_series_has_no_features() {
        assert!(extract_features(&Series::default(), &IndicatorParams::default()).is_none());
    }

    #[test]
    fn single_bar_uses_defaults() {
        let f = extract_features(&series_of(&[250.0]), &IndicatorParams::default()).unwrap();
        assert_eq!(f.close, 250.0);
        assert_eq!(f.ma10, 0.0);
        assert_eq!(f.ma50, 0.0);
        assert_eq!(f.ema20, 0.0);
        assert_eq!(f.rsi, 50.0);
        assert_eq!(f.atr, 0.0);
        assert_eq!(f.trend_strength, 0.0);
        assert_eq!(f.range_index, FLAT_RANGE_INDEX);
        assert_eq!(f.volatility, 0.0);
        assert_eq!(f.support, 250.0);
        assert_eq!(f.resistance, 250.0);
        assert_eq!(f.ret1, 0.0);
        assert_eq!(f.ret5, 0.0);
        assert_eq!(f.vwap, 250.0);
        assert!(f.is_finite());
    }

    #[test]
    fn log_returns() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 110.0];
        let f = extract_features(&series_of(&closes), &IndicatorParams::default()).unwrap();
        assert!((f.ret1 - (110.0_f64 / 105.0).ln()).abs() < 1e-12);
        assert!((f.ret5 - (110.0_f64 / 101.0).ln()).abs() < 1e-12);

        let short = extract_features(&series_of(&[100.0, 110.0]), &IndicatorParams::default())
            .unwrap();
        assert!((short.ret1 - (1.1_f64).ln()).abs() < 1e-12);
        assert_eq!(short.ret5, 0.0);
    }

    #[test]
    fn full_series_populates_every_feature() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 500.0 + (i as f64 * 0.2).sin() * 8.0 + i as f64 * 0.05)
            .collect();
        let f = extract_features(&series_of(&closes), &IndicatorParams::default()).unwrap();
        assert!(f.is_finite());
        assert!(f.ma10 > 0.0 && f.ma50 > 0.0 && f.ema20 > 0.0 && f.ema50 > 0.0);
        assert!(f.atr > 0.0);
        assert!(f.support <= f.close && f.close <= f.resistance);
        assert!((0.0..=100.0).contains(&f.range_index));
        assert!((0.0..=100.0).contains(&f.rsi));
    }

    #[test]
    fn lookup_by_name_matches_fields() {
        let f = FeatureVector {
            trend_strength: 3.5,
            range_index: 42.0,
            ..FeatureVector::default()
        };
        assert_eq!(f.get("trendStrength"), Some(3.5));
        assert_eq!(f.get("rangeIndex"), Some(42.0));
        assert_eq!(f.get("vol"), None);
        assert_eq!(f.iter().count(), FEATURE_NAMES.len());
    }

    #[test]
    fn serialises_with_external_names() {
        let json = serde_json::to_value(FeatureVector::default()).unwrap();
        for name in FEATURE_NAMES {
            assert!(json.get(*name).is_some(), "missing key {name}");
        }
    }

    #[test]
    fn rounded_keeps_internal_precision_separate() {
        let f = FeatureVector {
            close: 101.23456,
            ret1: 0.0123456,
            ..FeatureVector::default()
        };
        let r = f.rounded();
        assert_eq!(r.close, 101.23);
        assert_eq!(r.ret1, 0.0123);
        assert_eq!(f.close, 101.23456);
    }
}
