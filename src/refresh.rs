// =============================================================================
// Refresh Cycle — one timer tick across every configured instrument
// =============================================================================
//
// Each instrument is refreshed independently: a provider failure or an
// invalid series for one symbol is logged and recorded, and the loop moves
// on.  A successful refresh replaces that symbol's previous result as a unit.
// =============================================================================

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::pipeline::{refresh_rng, Pipeline};
use crate::quote_source::QuoteSource;

/// Counts for one cycle, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub refreshed: usize,
    pub failed: usize,
}

/// Refresh every configured symbol once.
pub fn run_refresh_cycle(
    state: &AppState,
    pipeline: &Pipeline,
    source: &dyn QuoteSource,
    date: NaiveDate,
) -> CycleSummary {
    let cycle = state.next_cycle();
    let config = &state.runtime_config;
    let (symbols, seed) = (&config.symbols, config.path.seed);

    let mut summary = CycleSummary {
        cycle,
        ..CycleSummary::default()
    };

    for symbol in symbols {
        let raw = match source.fetch_bars(symbol) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol = %symbol, source = source.name(), error = %e, "quote fetch failed");
                state.push_error(format!("quote fetch failed: {e:#}"), Some(symbol));
                summary.failed += 1;
                continue;
            }
        };

        let mut rng = refresh_rng(seed, symbol, cycle);
        match pipeline.refresh(symbol, raw, date, &mut rng) {
            Ok(result) => {
                debug!(
                    symbol = %symbol,
                    source = %result.source,
                    signal = %result.signal,
                    score = result.score.total_score,
                    forecast = ?result.forecast.map(|f| f.predicted_close),
                    "refresh complete"
                );
                state.publish(result);
                summary.refreshed += 1;
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "refresh failed");
                state.push_error(format!("refresh failed: {e:#}"), Some(symbol));
                summary.failed += 1;
            }
        }
    }

    info!(
        cycle,
        refreshed = summary.refreshed,
        failed = summary.failed,
        "refresh cycle finished"
    );
    summary
}
