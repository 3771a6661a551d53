// =============================================================================
// Central Application State — TickPulse daemon
// =============================================================================
//
// Holds the latest refresh result per instrument plus the bookkeeping the API
// needs.  Results are published as whole `Arc<RefreshResult>` values: a reader
// either sees the previous result or the new one, never a mix of the two.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared collections.
//   - The runtime config is read-only once the daemon is up.
// =============================================================================

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::pipeline::RefreshResult;
use crate::runtime_config::RuntimeConfig;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded refresh failure for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// Instrument the failure belongs to, when there is one.
    pub symbol: Option<String>,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Serialisable view of the whole state, for `GET /api/v1/state` and the
/// WebSocket feed.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub state_version: u64,
    pub refresh_cycle: u64,
    pub server_time: i64,
    pub uptime_secs: u64,
    pub symbols: Vec<String>,
    pub results: Vec<Arc<RefreshResult>>,
    pub recent_errors: Vec<ErrorRecord>,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Shared state handed to the refresh loop and the API via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every published result or recorded error. The
    /// WebSocket feed uses this to detect changes and push updates.
    pub state_version: AtomicU64,

    /// Number of refresh cycles started so far.
    pub refresh_cycle: AtomicU64,

    pub runtime_config: Arc<RuntimeConfig>,

    results: RwLock<BTreeMap<String, Arc<RefreshResult>>>,

    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Instant when the daemon was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            refresh_cycle: AtomicU64::new(0),
            runtime_config: Arc::new(config),
            results: RwLock::new(BTreeMap::new()),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    /// Start a new refresh cycle and return its number.
    pub fn next_cycle(&self) -> u64 {
        self.refresh_cycle.fetch_add(1, Ordering::SeqCst)
    }

    // ── Results ─────────────────────────────────────────────────────────

    /// Replace the result for `result.symbol` in one swap.
    pub fn publish(&self, result: RefreshResult) {
        let result = Arc::new(result);
        self.results.write().insert(result.symbol.clone(), result);
        self.increment_version();
    }

    /// Latest result for `symbol`, if one has been published.
    pub fn latest(&self, symbol: &str) -> Option<Arc<RefreshResult>> {
        self.results.read().get(symbol).cloned()
    }

    /// Latest results for every symbol, ordered by symbol.
    pub fn all_results(&self) -> Vec<Arc<RefreshResult>> {
        self.results.read().values().cloned().collect()
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record a refresh failure. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted first.
    pub fn push_error(&self, message: String, symbol: Option<&str>) {
        let record = ErrorRecord {
            message,
            symbol: symbol.map(str::to_string),
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        drop(errors);

        self.increment_version();
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    pub fn build_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            state_version: self.current_state_version(),
            refresh_cycle: self.refresh_cycle.load(Ordering::SeqCst),
            server_time: Utc::now().timestamp_millis(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            symbols: self.runtime_config.symbols.clone(),
            results: self.all_results(),
            recent_errors: self.recent_errors.read().clone(),
        }
    }
}
