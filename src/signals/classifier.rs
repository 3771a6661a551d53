// =============================================================================
// Signal Classifier — rule-based trading bias
// =============================================================================
//
// Accumulates a real-valued score from a fixed rule set, then thresholds it:
//
//   RSI < 30                        +2.0     RSI > 70                    -2.0
//   MA10 > MA50                     +1.0     MA10 < MA50                 -1.0
//   EMA20 > EMA50                   +1.0     EMA20 < EMA50               -1.0
//   close <= support * 1.015        +1.5     close >= resistance * 0.985 -1.5
//
//   score >= 2 => BUY,  score <= -2 => SELL,  otherwise NEUTRAL
//
// A crossover rule only fires once both of its averages are warmed up.  Short
// series leave the slow average at its 0.0 sentinel, and comparing against
// that would read as a permanent bullish cross.
//
// The classifier holds no state between calls.
// =============================================================================

use serde::Serialize;

use crate::features::FeatureVector;
use crate::indicators::rsi::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::types::Signal;

pub const RSI_WEIGHT: f64 = 2.0;
pub const MA_CROSS_WEIGHT: f64 = 1.0;
pub const EMA_CROSS_WEIGHT: f64 = 1.0;
pub const LEVEL_WEIGHT: f64 = 1.5;

/// Close within 1.5 % above support counts as "near support".
pub const NEAR_SUPPORT_FACTOR: f64 = 1.015;
/// Close within 1.5 % below resistance counts as "near resistance".
pub const NEAR_RESISTANCE_FACTOR: f64 = 0.985;

pub const BUY_THRESHOLD: f64 = 2.0;
pub const SELL_THRESHOLD: f64 = -2.0;

/// The contribution of a single rule to the final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleContribution {
    pub rule: &'static str,
    pub contribution: f64,
}

/// Result of scoring one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierScore {
    pub total_score: f64,
    pub signal: Signal,
    /// Only the rules that fired, in evaluation order.
    pub contributions: Vec<RuleContribution>,
}

/// Stateless BUY / SELL / NEUTRAL classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalClassifier;

impl SignalClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a feature vector.
    pub fn classify(&self, features: &FeatureVector) -> Signal {
        self.score(features).signal
    }

    /// Score a feature vector and keep the per-rule breakdown.
    pub fn score(&self, f: &FeatureVector) -> ClassifierScore {
        let ma_ready = warmed_up(f.ma10, f.ma50);
        let ema_ready = warmed_up(f.ema20, f.ema50);
        let rules: [(&'static str, bool, f64); 8] = [
            ("rsi_oversold", f.rsi < RSI_OVERSOLD, RSI_WEIGHT),
            ("rsi_overbought", f.rsi > RSI_OVERBOUGHT, -RSI_WEIGHT),
            ("ma_bullish_cross", ma_ready && f.ma10 > f.ma50, MA_CROSS_WEIGHT),
            ("ma_bearish_cross", ma_ready && f.ma10 < f.ma50, -MA_CROSS_WEIGHT),
            ("ema_bullish_cross", ema_ready && f.ema20 > f.ema50, EMA_CROSS_WEIGHT),
            ("ema_bearish_cross", ema_ready && f.ema20 < f.ema50, -EMA_CROSS_WEIGHT),
            (
                "near_support",
                f.close <= f.support * NEAR_SUPPORT_FACTOR,
                LEVEL_WEIGHT,
            ),
            (
                "near_resistance",
                f.close >= f.resistance * NEAR_RESISTANCE_FACTOR,
                -LEVEL_WEIGHT,
            ),
        ];

        let contributions: Vec<RuleContribution> = rules
            .iter()
            .filter(|(_, fired, _)| *fired)
            .map(|&(rule, _, contribution)| RuleContribution { rule, contribution })
            .collect();

        let total_score: f64 = contributions.iter().map(|c| c.contribution).sum();

        ClassifierScore {
            total_score,
            signal: decide(total_score),
            contributions,
        }
    }
}

/// Both averages carry a real reading (prices are positive, so 0.0 is the
/// short-input sentinel).
fn warmed_up(fast: f64, slow: f64) -> bool {
    fast > 0.0 && slow > 0.0
}

/// Map a score onto a signal.
pub fn decide(score: f64) -> Signal {
    if score >= BUY_THRESHOLD {
        Signal::Buy
    } else if score <= SELL_THRESHOLD {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Features where no rule fires: mid RSI, equal averages, price mid-range.
    fn quiet() -> FeatureVector {
        FeatureVector {
            close: 100.0,
            ma10: 100.0,
            ma50: 100.0,
            ema20: 100.0,
            ema50: 100.0,
            rsi: 50.0,
            support: 90.0,
            resistance: 110.0,
            ..FeatureVector::default()
        }
    }

    #[test]
    fn quiet_market_is_neutral_with_zero_score() {
        let s = SignalClassifier::new().score(&quiet());
        assert_eq!(s.total_score, 0.0);
        assert!(s.contributions.is_empty());
        assert_eq!(s.signal, Signal::Neutral);
    }

    #[test]
    fn oversold_uptrend_near_support_is_buy() {
        let support = 100.0;
        let f = FeatureVector {
            rsi: 25.0,
            ma10: 105.0,
            ma50: 100.0,
            support,
            close: support * 1.01,
            resistance: 130.0,
            ..quiet()
        };
        let s = SignalClassifier::new().score(&f);
        assert!((s.total_score - 4.5).abs() < 1e-12);
        assert_eq!(s.signal, Signal::Buy);
        assert_eq!(SignalClassifier::new().classify(&f), Signal::Buy);
    }

    #[test]
    fn overbought_downtrend_near_resistance_is_sell() {
        let resistance = 120.0;
        let f = FeatureVector {
            rsi: 75.0,
            ma10: 95.0,
            ma50: 100.0,
            resistance,
            close: resistance * 0.99,
            support: 80.0,
            ..quiet()
        };
        let s = SignalClassifier::new().score(&f);
        assert!((s.total_score + 4.5).abs() < 1e-12);
        assert_eq!(s.signal, Signal::Sell);
    }

    #[test]
    fn ema_crossover_participates() {
        let f = FeatureVector {
            ma10: 101.0,
            ema20: 101.0,
            ema50: 100.0,
            ..quiet()
        };
        let s = SignalClassifier::new().score(&f);
        assert_eq!(s.total_score, 2.0);
        assert_eq!(s.signal, Signal::Buy);
        let rules: Vec<&str> = s.contributions.iter().map(|c| c.rule).collect();
        assert_eq!(rules, vec!["ma_bullish_cross", "ema_bullish_cross"]);
    }

    #[test]
    fn unwarmed_slow_averages_do_not_cross() {
        // 40 bars: the 10/20 windows are filled, the 50 windows are not.
        let f = FeatureVector {
            ma10: 200.0,
            ma50: 0.0,
            ema20: 200.0,
            ema50: 0.0,
            ..quiet()
        };
        let s = SignalClassifier::new().score(&f);
        assert_eq!(s.total_score, 0.0);
        assert!(s.contributions.is_empty());
        assert_eq!(s.signal, Signal::Neutral);
    }

    #[test]
    fn near_support_and_resistance_can_cancel() {
        // Tight range: the close is near both levels.
        let f = FeatureVector {
            support: 99.5,
            resistance: 100.5,
            ..quiet()
        };
        let s = SignalClassifier::new().score(&f);
        assert_eq!(s.total_score, 0.0);
        assert_eq!(s.contributions.len(), 2);
        assert_eq!(s.signal, Signal::Neutral);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(decide(2.0), Signal::Buy);
        assert_eq!(decide(1.999), Signal::Neutral);
        assert_eq!(decide(-2.0), Signal::Sell);
        assert_eq!(decide(-1.5), Signal::Neutral);
    }

    #[test]
    fn rsi_boundaries_do_not_fire() {
        let at_30 = FeatureVector { rsi: 30.0, ..quiet() };
        let at_70 = FeatureVector { rsi: 70.0, ..quiet() };
        assert_eq!(SignalClassifier::new().score(&at_30).total_score, 0.0);
        assert_eq!(SignalClassifier::new().score(&at_70).total_score, 0.0);
    }
}
