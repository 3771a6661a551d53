use serde::Serialize;
use tracing::debug;

use crate::types::Bar;

// ---------------------------------------------------------------------------
// Series -- validated, immutable price history
// ---------------------------------------------------------------------------

/// An ordered, validated sequence of bars.
///
/// Construction drops every bar whose close is non-finite or non-positive,
/// sorts by timestamp and removes duplicate timestamps (the first occurrence
/// wins). Non-finite optional OHLCV fields are cleared rather than dropping
/// the bar. Once built the series is never mutated; a refresh builds a new
/// one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Validate raw provider bars into a series.
    pub fn from_bars(raw: impl IntoIterator<Item = Bar>) -> Self {
        let mut received = 0usize;
        let mut bars: Vec<Bar> = raw
            .into_iter()
            .inspect(|_| received += 1)
            .filter(|b| b.close.is_finite() && b.close > 0.0)
            .map(sanitise_optional_fields)
            .collect();
        let malformed = received - bars.len();

        // Stable sort keeps provider order among equal timestamps so that
        // dedup retains the first one delivered.
        bars.sort_by_key(|b| b.timestamp);
        let before_dedup = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        let duplicates = before_dedup - bars.len();

        if malformed > 0 || duplicates > 0 {
            debug!(
                received,
                malformed,
                duplicates,
                kept = bars.len(),
                "series validation dropped bars"
            );
        }

        Self { bars }
    }

    /// Build a close-only series from `(timestamp, close)` pairs.
    pub fn from_closes(points: impl IntoIterator<Item = (i64, f64)>) -> Self {
        Self::from_bars(points.into_iter().map(|(ts, close)| Bar::new(ts, close)))
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The prefix ending at (and including) `index`.
    pub fn prefix(&self, index: usize) -> Series {
        let end = (index + 1).min(self.bars.len());
        Self {
            bars: self.bars[..end].to_vec(),
        }
    }

    /// Spacing between the last two bars, if there are at least two.
    pub fn last_spacing(&self) -> Option<i64> {
        match self.bars.as_slice() {
            [.., prev, last] => Some(last.timestamp - prev.timestamp),
            _ => None,
        }
    }
}

fn sanitise_optional_fields(mut bar: Bar) -> Bar {
    let keep = |v: Option<f64>| v.filter(|x| x.is_finite());
    bar.open = keep(bar.open);
    bar.high = keep(bar.high);
    bar.low = keep(bar.low);
    bar.volume = keep(bar.volume).filter(|v| *v >= 0.0);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_finite_and_non_positive_closes() {
        let series = Series::from_closes(vec![
            (1, 10.0),
            (2, f64::NAN),
            (3, -4.0),
            (4, 0.0),
            (5, f64::INFINITY),
            (6, 11.0),
        ]);
        assert_eq!(series.closes(), vec![10.0, 11.0]);
    }

    #[test]
    fn sorts_and_removes_duplicate_timestamps() {
        let series = Series::from_closes(vec![(3, 30.0), (1, 10.0), (2, 20.0), (2, 99.0)]);
        let stamps: Vec<i64> = series.bars().iter().map(|b| b.timestamp).collect();
        assert_eq!(stamps, vec![1, 2, 3]);
        assert_eq!(series.closes(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn clears_bad_optional_fields_but_keeps_bar() {
        let mut bar = Bar::new(1, 10.0);
        bar.high = Some(f64::NAN);
        bar.low = Some(9.0);
        bar.volume = Some(-5.0);
        let series = Series::from_bars(vec![bar]);
        let kept = series.bars()[0];
        assert_eq!(kept.high, None);
        assert_eq!(kept.low, Some(9.0));
        assert_eq!(kept.volume, None);
    }

    #[test]
    fn prefix_and_spacing() {
        let series = Series::from_closes((0..5).map(|i| (i * 60_000, 100.0 + i as f64)));
        assert_eq!(series.prefix(2).len(), 3);
        assert_eq!(series.prefix(99).len(), 5);
        assert_eq!(series.last_spacing(), Some(60_000));
        assert_eq!(Series::from_closes(vec![(0, 1.0)]).last_spacing(), None);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let series = Series::from_bars(Vec::new());
        assert!(series.is_empty());
        assert!(series.last().is_none());
    }
}
