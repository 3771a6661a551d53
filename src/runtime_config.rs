// =============================================================================
// Runtime Configuration — pipeline settings with atomic save
// =============================================================================
//
// Every tunable the refresh pipeline needs lives here and is handed to the
// core explicitly: session bounds, path shape, indicator windows and the
// forecast coefficient table.  Nothing in the core reads global state.
//
// The daemon only reads its config.  A default file is written on first run
// (atomic tmp + rename) and an existing file is never rewritten.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::features::IndicatorParams;
use crate::market_data::{PathParams, SessionWindow};
use crate::model::CoefficientTable;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    vec![
        "RELIANCE".to_string(),
        "TCS".to_string(),
        "HDFCBANK".to_string(),
        "INFY".to_string(),
        "SBIN".to_string(),
    ]
}

fn default_fallback_anchor() -> f64 {
    1000.0
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_min_live_points() -> usize {
    30
}

fn default_forecast_warmup() -> usize {
    5
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the TickPulse daemon.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Instruments ---------------------------------------------------------

    /// Symbols refreshed on every cycle.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Last known price per symbol, served by the static quote source.
    #[serde(default)]
    pub anchors: BTreeMap<String, f64>,

    /// Anchor used when neither the provider nor `anchors` has a valid close.
    #[serde(default = "default_fallback_anchor")]
    pub fallback_anchor: f64,

    // --- Refresh -------------------------------------------------------------

    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Fewer validated provider bars than this triggers path synthesis.
    #[serde(default = "default_min_live_points")]
    pub min_live_points: usize,

    /// Bars required before the first rolling forecast point.
    #[serde(default = "default_forecast_warmup")]
    pub forecast_warmup: usize,

    // --- Core parameters -----------------------------------------------------

    #[serde(default)]
    pub session: SessionWindow,

    #[serde(default)]
    pub path: PathParams,

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub coefficients: CoefficientTable,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            anchors: BTreeMap::new(),
            fallback_anchor: default_fallback_anchor(),
            refresh_interval_secs: default_refresh_interval_secs(),
            min_live_points: default_min_live_points(),
            forecast_warmup: default_forecast_warmup(),
            session: SessionWindow::default(),
            path: PathParams::default(),
            indicators: IndicatorParams::default(),
            coefficients: CoefficientTable::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid runtime config in {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            refresh_interval_secs = config.refresh_interval_secs,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Load `path`, or write the defaults there when no file exists yet.
    ///
    /// An existing file is never overwritten: if it fails to parse or
    /// validate, the error is returned and the file is left as it is.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let config = Self::default();
        config
            .save(path)
            .with_context(|| format!("failed to write default config to {}", path.display()))?;
        info!(path = %path.display(), "no runtime config found, wrote defaults");
        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.refresh_interval_secs > 0, "refresh_interval_secs must be positive");
        ensure!(
            self.fallback_anchor.is_finite() && self.fallback_anchor > 0.0,
            "fallback_anchor must be a finite positive price"
        );
        ensure!(self.session.step_secs > 0, "session.step_secs must be positive");
        ensure!(
            self.session.end >= self.session.start,
            "session.end must not be before session.start"
        );
        for (symbol, price) in &self.anchors {
            ensure!(
                price.is_finite() && *price > 0.0,
                "anchor for {symbol} must be a finite positive price"
            );
        }
        self.coefficients.validate()?;
        Ok(())
    }
}
