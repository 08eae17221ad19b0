//! Per-instance bookkeeping and its observable snapshots.

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::ResultCache;

/// A dispatched fetch whose outcome has not yet been observed.
#[derive(Debug)]
pub(crate) struct InFlight {
    /// Normalized query handed to the backend.
    pub query: String,
    /// Token signalled when this lookup is superseded or cancelled.
    pub cancel: CancellationToken,
    /// Sequence number captured when the fetch was dispatched.
    pub seq: u64,
}

/// All mutable state owned by one orchestrator instance.
///
/// Guarded by a single mutex that is never held across an await; the lock
/// exists because timer and fetch tasks touch the same bookkeeping, not
/// because there is more than one logical thread of control.
pub(crate) struct RunState<R> {
    /// Raw text from the most recent `set_text` call.
    pub latest_text: Option<String>,
    /// Last query actually handed to the backend (or satisfied from cache);
    /// the reference point for the near-duplicate filter.
    pub last_dispatched: Option<String>,
    /// Last query whose results were observed.
    pub last_completed_query: Option<String>,
    /// Results of the last completed attempt.
    pub last_results: Option<R>,
    /// The at-most-one live fetch.
    pub in_flight: Option<InFlight>,
    /// Abort handle for the at-most-one pending debounce timer.
    pub timer: Option<AbortHandle>,
    /// Bumped on every input event; a fired timer whose generation no longer
    /// matches must not dispatch.
    pub timer_generation: u64,
    /// Normalized query -> results memo.
    pub cache: ResultCache<R>,
    /// Activity counters.
    pub stats: OrchestratorStats,
}

impl<R> RunState<R> {
    pub fn new() -> Self {
        Self {
            latest_text: None,
            last_dispatched: None,
            last_completed_query: None,
            last_results: None,
            in_flight: None,
            timer: None,
            timer_generation: 0,
            cache: ResultCache::new(),
            stats: OrchestratorStats::default(),
        }
    }
}

/// Read-only snapshot of the orchestrator's observable state.
#[derive(Debug, Clone)]
pub struct OrchestratorState<R> {
    /// Raw text from the most recent `set_text` call.
    pub latest_text: Option<String>,
    /// Last query whose results were observed.
    pub last_completed_query: Option<String>,
    /// Results of the last completed attempt.
    pub last_results: Option<R>,
    /// Query currently being fetched, if any.
    pub in_flight_query: Option<String>,
    /// Whether a fetch is currently live.
    pub is_in_flight: bool,
    /// Number of cache entries held (fresh or not).
    pub cache_size: usize,
}

/// Monotonic counters describing orchestrator activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrchestratorStats {
    /// Live fetches handed to the backend.
    pub dispatched: u64,
    /// Attempts served from the cache.
    pub cache_hits: u64,
    /// Inputs rejected by the length gate.
    pub skipped_short: u64,
    /// Exact or in-flight duplicates.
    pub skipped_duplicate: u64,
    /// Suppressed by the near-duplicate heuristic.
    pub skipped_near_duplicate: u64,
    /// Responses discarded by the sequence guard.
    pub stale_discarded: u64,
    /// Fetches that ended in cancellation.
    pub cancelled: u64,
    /// Fetches surfaced through the error callback.
    pub errors: u64,
}

impl OrchestratorStats {
    /// Total attempts suppressed without reaching the backend.
    pub fn total_skipped(&self) -> u64 {
        self.skipped_short + self.skipped_duplicate + self.skipped_near_duplicate
    }
}
