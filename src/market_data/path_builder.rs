// =============================================================================
// Session Path Builder — anchored intraday random walk
// =============================================================================
//
// When the quote provider returns too few bars for a meaningful chart, a
// per-minute path spanning the trading session is synthesized around the last
// known price.
//
// Each step adds to the previous raw value:
//   smooth = sin(elapsed_ms * frequency) * amplitude
//   jitter = (u - 0.5) * jitter_width,   u ~ Uniform[0, 1)
//
// The walk is cumulative and nothing mean-reverts, but the step sizes are in
// absolute price units, so a low anchor could drift through zero.  Each raw
// value is floored at `anchor * MIN_PRICE_FRACTION` and the walk continues
// from the floored value; every point stays a valid close.  The
// random source is always injected by the caller so that a fixed seed
// reproduces the exact same path.
// =============================================================================

use anyhow::{ensure, Result};
use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::market_data::Series;
use crate::types::round2;

/// Lowest value the walk may reach, as a fraction of the anchor.
pub const MIN_PRICE_FRACTION: f64 = 0.01;

fn default_session_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default()
}

fn default_session_end() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default()
}

fn default_step_secs() -> u32 {
    60
}

fn default_amplitude() -> f64 {
    1.4
}

fn default_frequency() -> f64 {
    0.000_002_5
}

fn default_jitter() -> f64 {
    1.1
}

/// Trading-session bounds, inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWindow {
    #[serde(default = "default_session_start")]
    pub start: NaiveTime,
    #[serde(default = "default_session_end")]
    pub end: NaiveTime,
    #[serde(default = "default_step_secs")]
    pub step_secs: u32,
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self {
            start: default_session_start(),
            end: default_session_end(),
            step_secs: default_step_secs(),
        }
    }
}

impl SessionWindow {
    /// Number of points a path over this window will contain.
    pub fn point_count(&self) -> usize {
        if self.step_secs == 0 || self.end < self.start {
            return 0;
        }
        let span = (self.end - self.start).num_seconds();
        (span / i64::from(self.step_secs)) as usize + 1
    }
}

/// Shape of the synthesized walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathParams {
    /// Amplitude of the smooth sine term, in price units.
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Angular frequency applied to milliseconds elapsed since session start.
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    /// Total width of the zero-centred uniform jitter.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    /// Base seed. `None` means the caller draws entropy from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            amplitude: default_amplitude(),
            frequency: default_frequency(),
            jitter: default_jitter(),
            seed: None,
        }
    }
}

/// One point of a synthesized path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathPoint {
    pub timestamp: i64,
    /// Unrounded value; every downstream computation uses this.
    pub raw: f64,
    /// `raw` rounded to 2 decimals, for display only.
    pub display: f64,
}

pub struct PathBuilder {
    params: PathParams,
}

impl PathBuilder {
    pub fn new(params: PathParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Build the session path for `date`, anchored at `anchor`.
    ///
    /// Fails when the anchor is not a finite positive price, the session ends
    /// before it starts, the step is zero, or a walk parameter is non-finite.
    pub fn build<R: Rng>(
        &self,
        anchor: f64,
        session: &SessionWindow,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<PathPoint>> {
        ensure!(
            anchor.is_finite() && anchor > 0.0,
            "anchor price must be finite and positive, got {anchor}"
        );
        ensure!(session.step_secs > 0, "session step must be positive");
        ensure!(
            session.end >= session.start,
            "session end {} is before start {}",
            session.end,
            session.start
        );
        ensure!(
            self.params.amplitude.is_finite()
                && self.params.frequency.is_finite()
                && self.params.jitter.is_finite(),
            "path parameters must be finite"
        );

        let start_ms = date.and_time(session.start).and_utc().timestamp_millis();
        let step_ms = i64::from(session.step_secs) * 1_000;

        let count = session.point_count();
        let mut points = Vec::with_capacity(count);
        let floor = anchor * MIN_PRICE_FRACTION;
        let mut value = anchor;

        for i in 0..count {
            let elapsed_ms = i as i64 * step_ms;
            value += (elapsed_ms as f64 * self.params.frequency).sin() * self.params.amplitude;
            value += (rng.random::<f64>() - 0.5) * self.params.jitter;
            value = value.max(floor);

            points.push(PathPoint {
                timestamp: start_ms + elapsed_ms,
                raw: value,
                display: round2(value),
            });
        }

        Ok(points)
    }
}

/// Turn a synthesized path into a validated series over its raw values.
pub fn path_to_series(points: &[PathPoint]) -> Series {
    Series::from_closes(points.iter().map(|p| (p.timestamp, p.raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn default_session_has_376_minutes() {
        // 09:15 through 15:30 inclusive.
        assert_eq!(SessionWindow::default().point_count(), 376);
    }

    #[test]
    fn same_seed_reproduces_identical_path() {
        let builder = PathBuilder::new(PathParams::default());
        let session = SessionWindow::default();
        let a = builder
            .build(2500.0, &session, date(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = builder
            .build(2500.0, &session, date(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);

        let c = builder
            .build(2500.0, &session, date(), &mut StdRng::seed_from_u64(43))
            .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn timestamps_step_one_minute_from_session_start() {
        let builder = PathBuilder::new(PathParams::default());
        let path = builder
            .build(100.0, &SessionWindow::default(), date(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        let start = date()
            .and_time(NaiveTime::from_hms_opt(9, 15, 0).unwrap())
            .and_utc()
            .timestamp_millis();
        assert_eq!(path[0].timestamp, start);
        assert!(path.windows(2).all(|w| w[1].timestamp - w[0].timestamp == 60_000));
        assert_eq!(path.last().unwrap().timestamp - start, 375 * 60_000);
    }

    #[test]
    fn walk_is_cumulative_without_jitter() {
        // No jitter and zero frequency: each step adds sin(0) = 0, path stays flat.
        let flat = PathBuilder::new(PathParams {
            amplitude: 1.4,
            frequency: 0.0,
            jitter: 0.0,
            seed: None,
        });
        let path = flat
            .build(50.0, &SessionWindow::default(), date(), &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert!(path.iter().all(|p| (p.raw - 50.0).abs() < 1e-12));

        // Constant positive increments accumulate step over step.
        let session = SessionWindow {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 3, 0).unwrap(),
            step_secs: 60,
        };
        let drifting = PathBuilder::new(PathParams {
            amplitude: 1.0,
            frequency: std::f64::consts::FRAC_PI_2 / 60_000.0,
            jitter: 0.0,
            seed: None,
        });
        let path = drifting
            .build(10.0, &session, date(), &mut StdRng::seed_from_u64(7))
            .unwrap();
        // sin(0)=0, sin(pi/2)=1, sin(pi)=0, sin(3pi/2)=-1
        let expected = [10.0, 11.0, 11.0, 10.0];
        for (p, e) in path.iter().zip(expected) {
            assert!((p.raw - e).abs() < 1e-9, "got {}, expected {e}", p.raw);
        }
    }

    #[test]
    fn display_is_rounded_raw_is_not() {
        let builder = PathBuilder::new(PathParams::default());
        let path = builder
            .build(1234.5678, &SessionWindow::default(), date(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        for p in &path {
            assert_eq!(p.display, round2(p.raw));
        }
        assert!(path.iter().any(|p| p.raw != p.display));
    }

    #[test]
    fn jitter_is_bounded_per_step() {
        let builder = PathBuilder::new(PathParams {
            amplitude: 0.0,
            frequency: 0.0,
            jitter: 1.1,
            seed: None,
        });
        let path = builder
            .build(500.0, &SessionWindow::default(), date(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert!((path[0].raw - 500.0).abs() <= 0.55);
        for w in path.windows(2) {
            assert!((w[1].raw - w[0].raw).abs() <= 0.55);
        }
    }

    #[test]
    fn rejects_bad_anchor_and_session() {
        let builder = PathBuilder::new(PathParams::default());
        let mut rng = StdRng::seed_from_u64(0);
        let session = SessionWindow::default();
        assert!(builder.build(0.0, &session, date(), &mut rng).is_err());
        assert!(builder.build(-1.0, &session, date(), &mut rng).is_err());
        assert!(builder.build(f64::NAN, &session, date(), &mut rng).is_err());

        let inverted = SessionWindow {
            start: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            step_secs: 60,
        };
        assert!(builder.build(100.0, &inverted, date(), &mut rng).is_err());

        let zero_step = SessionWindow {
            step_secs: 0,
            ..SessionWindow::default()
        };
        assert!(builder.build(100.0, &zero_step, date(), &mut rng).is_err());
    }

    #[test]
    fn low_anchor_walk_stays_positive() {
        let builder = PathBuilder::new(PathParams::default());
        let session = SessionWindow::default();
        for seed in 0..20 {
            let path = builder
                .build(2.0, &session, date(), &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert!(
                path.iter().all(|p| p.raw >= 2.0 * MIN_PRICE_FRACTION),
                "seed {seed} went below the floor"
            );
            assert_eq!(path_to_series(&path).len(), path.len());
        }
    }

    #[test]
    fn floor_does_not_touch_ordinary_anchors() {
        // The largest possible drift over a session is far below 99 % of 1000.
        let builder = PathBuilder::new(PathParams::default());
        let free = builder
            .build(1000.0, &SessionWindow::default(), date(), &mut StdRng::seed_from_u64(4))
            .unwrap();
        assert!(free.iter().all(|p| p.raw > 1000.0 * MIN_PRICE_FRACTION + 200.0));
    }

    #[test]
    fn path_converts_to_series_of_raw_values() {
        let builder = PathBuilder::new(PathParams::default());
        let path = builder
            .build(800.0, &SessionWindow::default(), date(), &mut StdRng::seed_from_u64(11))
            .unwrap();
        let series = path_to_series(&path);
        assert_eq!(series.len(), path.len());
        assert_eq!(series.closes()[10], path[10].raw);
    }
}
