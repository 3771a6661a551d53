// =============================================================================
// Refresh Pipeline — provider bars in, immutable result out
// =============================================================================
//
//   raw bars ─► Series::from_bars ─┬─ enough bars ──────────────► Series (Live)
//                                  └─ too few ─► PathBuilder ───► Series (Synthesized)
//   Series ─► extract_features ─► { ForecastModel, SignalClassifier } ─► RefreshResult
//
// Every refresh builds a fresh result from scratch; nothing is carried over
// from the previous cycle except what the caller passes in explicitly.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::features::{extract_features, FeatureVector, IndicatorParams};
use crate::indicators::{calculate_bollinger, calculate_macd, rsi_zone, BollingerResult, MacdResult};
use crate::market_data::{path_to_series, PathBuilder, Series, SessionWindow};
use crate::model::ForecastModel;
use crate::runtime_config::RuntimeConfig;
use crate::signals::{ClassifierScore, SignalClassifier};
use crate::types::{round2, round_to, Bar, ForecastPoint, Signal};

// =============================================================================
// Result types
// =============================================================================

/// Where the series behind a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    /// Provider bars, validated.
    Live,
    /// Session path synthesized around an anchor price.
    Synthesized,
}

impl std::fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Synthesized => write!(f, "synthesized"),
        }
    }
}

/// A chart point at display precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub close: f64,
}

/// Everything one refresh produces for one instrument.
///
/// Built completely before it is published, and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResult {
    pub id: Uuid,
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub source: SeriesSource,
    pub anchor: Option<f64>,
    pub chart: Vec<ChartPoint>,
    /// Full-precision features used by the model and classifier.
    #[serde(skip)]
    pub raw_features: FeatureVector,
    /// Display copy of `raw_features`.
    pub features: FeatureVector,
    pub rsi_zone: &'static str,
    pub signal: Signal,
    pub score: ClassifierScore,
    pub forecast: Option<ForecastPoint>,
    pub forecast_series: Vec<ForecastPoint>,
    pub bollinger: Option<BollingerResult>,
    pub macd: Option<MacdResult>,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Immutable bundle of everything a refresh needs besides the input bars.
pub struct Pipeline {
    params: IndicatorParams,
    model: ForecastModel,
    classifier: SignalClassifier,
    path_builder: PathBuilder,
    session: SessionWindow,
    min_live_points: usize,
    fallback_anchor: f64,
    forecast_warmup: usize,
}

impl Pipeline {
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let model = ForecastModel::new(config.coefficients.clone())
            .context("invalid forecast coefficient table")?;
        Ok(Self {
            params: config.indicators.clone(),
            model,
            classifier: SignalClassifier::new(),
            path_builder: PathBuilder::new(config.path.clone()),
            session: config.session.clone(),
            min_live_points: config.min_live_points,
            fallback_anchor: config.fallback_anchor,
            forecast_warmup: config.forecast_warmup,
        })
    }

    pub fn model(&self) -> &ForecastModel {
        &self.model
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Validate provider bars, synthesizing a session path when too few
    /// survive.  Returns the series, its source, the anchor used (if any) and
    /// the display chart.
    pub fn prepare_series<R: Rng>(
        &self,
        raw: Vec<Bar>,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<(Series, SeriesSource, Option<f64>, Vec<ChartPoint>)> {
        let live = Series::from_bars(raw);

        if live.len() >= self.min_live_points.max(1) {
            let chart = chart_of(&live);
            return Ok((live, SeriesSource::Live, None, chart));
        }

        let anchor = live.last().map(|b| b.close).unwrap_or(self.fallback_anchor);
        debug!(
            live_points = live.len(),
            min_live_points = self.min_live_points,
            anchor,
            "too few live bars, synthesizing session path"
        );

        let path = self
            .path_builder
            .build(anchor, &self.session, date, rng)
            .context("failed to synthesize session path")?;
        let series = path_to_series(&path);
        let chart = chart_of(&series);

        Ok((series, SeriesSource::Synthesized, Some(anchor), chart))
    }

    /// Run the indicator engine, model and classifier over a prepared series.
    pub fn evaluate(
        &self,
        symbol: &str,
        series: &Series,
        source: SeriesSource,
        anchor: Option<f64>,
        chart: Vec<ChartPoint>,
    ) -> Result<RefreshResult> {
        let raw_features = extract_features(series, &self.params)
            .with_context(|| format!("no valid bars for {symbol}"))?;

        let score = self.classifier.score(&raw_features);
        let forecast_series = self
            .model
            .forecast_series(series, &self.params, self.forecast_warmup);
        let forecast = self.model.forecast_next(series, &self.params);

        let closes = series.closes();
        let bollinger = calculate_bollinger(&closes, self.params.bollinger_period, self.params.bollinger_mult)
            .map(|b| BollingerResult {
                upper: round2(b.upper),
                mid: round2(b.mid),
                lower: round2(b.lower),
            });
        let macd = calculate_macd(
            &closes,
            self.params.macd_fast,
            self.params.macd_slow,
            self.params.macd_signal,
        )
        .map(|m| MacdResult {
            line: round_to(m.line, 4),
            signal: round_to(m.signal, 4),
            histogram: round_to(m.histogram, 4),
        });

        Ok(RefreshResult {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            generated_at: Utc::now(),
            source,
            anchor,
            chart,
            features: raw_features.rounded(),
            rsi_zone: rsi_zone(raw_features.rsi),
            signal: score.signal,
            score,
            forecast,
            forecast_series,
            bollinger,
            macd,
            raw_features,
        })
    }

    /// Full refresh: prepare the series, then evaluate it.
    pub fn refresh<R: Rng>(
        &self,
        symbol: &str,
        raw: Vec<Bar>,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<RefreshResult> {
        let (series, source, anchor, chart) = self.prepare_series(raw, date, rng)?;
        self.evaluate(symbol, &series, source, anchor, chart)
    }
}

/// Display chart over exactly the bars the indicators see.
fn chart_of(series: &Series) -> Vec<ChartPoint> {
    series
        .bars()
        .iter()
        .map(|b| ChartPoint {
            timestamp: b.timestamp,
            close: round2(b.close),
        })
        .collect()
}

/// Random source for one refresh of one symbol.
///
/// With a base seed the stream is a pure function of `(seed, symbol, cycle)`,
/// so a rerun reproduces every path; without one it draws from the OS.
pub fn refresh_rng(seed: Option<u64>, symbol: &str, cycle: u64) -> StdRng {
    match seed {
        Some(base) => {
            // FNV-1a over the symbol keeps instruments on distinct streams.
            let symbol_hash = symbol.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
                (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
            let mixed = (base ^ symbol_hash).wrapping_add(cycle.wrapping_mul(0x9e37_79b9_7f4a_7c15));
            StdRng::seed_from_u64(mixed)
        }
        None => StdRng::from_os_rng(),
    }
}
