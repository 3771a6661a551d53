// =============================================================================
// Quote Source — seam to the external series provider
// =============================================================================
//
// Fetching quotes over the network is the provider's job and lives outside
// this crate.  The refresh loop only needs "give me whatever bars you have for
// this symbol"; failures are reported as errors and never retried here.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;

use crate::types::Bar;

/// Anything that can hand over raw bars for a symbol.
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &str;

    /// Raw bars for `symbol`, in any order, possibly containing bad values.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>>;
}

/// Serves a single last-known quote per symbol from configuration.
///
/// One bar is always "too few points", so every refresh driven by this source
/// synthesizes a session path around the configured anchor.
pub struct StaticQuoteSource {
    anchors: BTreeMap<String, f64>,
}

impl StaticQuoteSource {
    pub fn new(anchors: BTreeMap<String, f64>) -> Self {
        Self { anchors }
    }
}

impl QuoteSource for StaticQuoteSource {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>> {
        Ok(self
            .anchors
            .get(symbol)
            .map(|&price| vec![Bar::new(Utc::now().timestamp_millis(), price)])
            .unwrap_or_default())
    }
}
