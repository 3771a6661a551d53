// =============================================================================
// Forecast Model — fixed linear combination of engineered features
// =============================================================================
//
//   predicted = round2(intercept + Σ weight[name] * normalize(feature[name]))
//
// `normalize` truncates each feature to 6 decimal places and maps non-finite
// values to 0 so one pathological reading cannot blow up the sum.  The
// coefficient table is static configuration; nothing here is fitted.
// Weights are summed in name order (BTreeMap) so identical inputs always
// produce bit-identical output.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::features::{extract_features, FeatureVector, IndicatorParams, FEATURE_NAMES};
use crate::market_data::Series;
use crate::types::{round2, ForecastPoint};

/// Decimal places kept by [`normalize`].
pub const NORMALIZE_DECIMALS: i32 = 6;

/// Spacing assumed for the next bar when the series has only one bar.
pub const DEFAULT_BAR_SPACING_MS: i64 = 60_000;

fn default_intercept() -> f64 {
    0.72
}

fn default_weights() -> BTreeMap<String, f64> {
    [
        ("close", 0.61),
        ("ma10", 0.18),
        ("ma50", -0.07),
        ("rsi", 0.03),
        ("volatility", -0.02),
        ("support", 0.11),
        ("resistance", 0.12),
        ("ret1", 0.22),
        ("ret5", 0.08),
        ("atr", 0.05),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Intercept plus per-feature weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    #[serde(default = "default_intercept")]
    pub intercept: f64,
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f64>,
}

impl Default for CoefficientTable {
    fn default() -> Self {
        Self {
            intercept: default_intercept(),
            weights: default_weights(),
        }
    }
}

impl CoefficientTable {
    /// Reject unknown feature names and non-finite coefficients.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.intercept.is_finite(),
            "coefficient intercept must be finite, got {}",
            self.intercept
        );
        for (name, weight) in &self.weights {
            ensure!(
                FEATURE_NAMES.contains(&name.as_str()),
                "coefficient table references unknown feature {name:?}"
            );
            ensure!(
                weight.is_finite(),
                "weight for {name:?} must be finite, got {weight}"
            );
        }
        Ok(())
    }
}

/// Truncate to [`NORMALIZE_DECIMALS`] places; non-finite input becomes 0.
pub fn normalize(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(NORMALIZE_DECIMALS);
    let truncated = (value * factor).trunc() / factor;
    if truncated.is_finite() {
        truncated
    } else {
        0.0
    }
}

/// Applies a validated [`CoefficientTable`] to feature vectors.
#[derive(Debug, Clone)]
pub struct ForecastModel {
    table: CoefficientTable,
}

impl ForecastModel {
    pub fn new(table: CoefficientTable) -> Result<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &CoefficientTable {
        &self.table
    }

    /// One-step-ahead predicted close, rounded to 2 decimals.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let sum = self
            .table
            .weights
            .iter()
            .fold(self.table.intercept, |acc, (name, weight)| {
                // Names were validated at construction.
                let value = features.get(name).unwrap_or(0.0);
                acc + weight * normalize(value)
            });
        round2(sum)
    }

    /// Forecast for the bar after the last bar of `series`.
    pub fn forecast_next(&self, series: &Series, params: &IndicatorParams) -> Option<ForecastPoint> {
        let last = series.last()?;
        let features = extract_features(series, params)?;
        Some(ForecastPoint {
            timestamp: last.timestamp + series.last_spacing().unwrap_or(DEFAULT_BAR_SPACING_MS),
            predicted_close: self.predict(&features),
        })
    }

    /// Rolling one-step-ahead forecasts.
    ///
    /// For every bar index `i >= warmup - 1` the features of the prefix ending
    /// at `i` predict the close of bar `i + 1`; the point carries that bar's
    /// timestamp.  The final point falls one bar spacing past the series end
    /// and equals [`ForecastModel::forecast_next`].  Returns an empty vector
    /// when the series has fewer than `warmup` bars.
    ///
    /// Every prefix is copied and fully re-extracted, so the cost is
    /// quadratic in the series length (about 70k bar reads for a 376-point
    /// session).
    pub fn forecast_series(
        &self,
        series: &Series,
        params: &IndicatorParams,
        warmup: usize,
    ) -> Vec<ForecastPoint> {
        let warmup = warmup.max(1);
        if series.len() < warmup {
            return Vec::new();
        }

        let bars = series.bars();
        let spacing = series.last_spacing().unwrap_or(DEFAULT_BAR_SPACING_MS);
        let mut points = Vec::with_capacity(series.len() - warmup + 1);

        for i in (warmup - 1)..series.len() {
            let prefix = series.prefix(i);
            let Some(features) = extract_features(&prefix, params) else {
                continue;
            };
            let timestamp = bars
                .get(i + 1)
                .map(|b| b.timestamp)
                .unwrap_or(bars[i].timestamp + spacing);
            points.push(ForecastPoint {
                timestamp,
                predicted_close: self.predict(&features),
            });
        }

        trace!(points = points.len(), warmup, "forecast series built");
        points
    }
}
