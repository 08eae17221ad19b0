//! The query orchestrator.
//!
//! Turns a high-frequency stream of input-change events into a bounded set
//! of recall lookups. One instance per input surface; all scheduling,
//! caching, and race handling lives here.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        QueryOrchestrator                         │
//! │                                                                  │
//! │  set_text ─▶ normalize ─▶ length gate ─▶ dup filter ─▶ debounce  │
//! │                                                            │     │
//! │  run_immediate ────────────────────────────────────────────┤     │
//! │                                                            ▼     │
//! │            cache probe ──hit──▶ on_success(from_cache)  dispatch │
//! │                │ miss / refresh                                  │
//! │                ▼                                                 │
//! │     in-flight takeover (signal superseded token) ─▶ fetch        │
//! │                                                       │          │
//! │             sequence guard ◀── settle ◀───────────────┘          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The only suspension points are the debounce sleep and the backend fetch,
//! both on spawned tasks; every decision runs synchronously under one
//! bookkeeping lock that is never held across an await. Public methods must
//! be called from within a tokio runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::backend::{NoopEvents, RecallBackend, RecallEvents};
use crate::config::{ConfigPatch, OrchestratorConfig};
use crate::error::FetchResult;
use crate::query;

mod state;

pub use state::{OrchestratorState, OrchestratorStats};

use state::{InFlight, RunState};

/// Client-side orchestrator for recall lookups.
///
/// Owns the debounce timer, the result cache, the in-flight slot, and the
/// sequence counter for one input surface. Cheap to clone; clones share the
/// same instance.
pub struct QueryOrchestrator<B, E = NoopEvents>
where
    B: RecallBackend,
    E: RecallEvents<B::Results>,
{
    inner: Arc<Inner<B, E>>,
}

impl<B, E> Clone for QueryOrchestrator<B, E>
where
    B: RecallBackend,
    E: RecallEvents<B::Results>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> QueryOrchestrator<B>
where
    B: RecallBackend,
{
    /// Create an orchestrator with no lifecycle observer
    pub fn new(backend: B, config: OrchestratorConfig) -> Self {
        Self::with_events(backend, NoopEvents, config)
    }
}

impl<B, E> QueryOrchestrator<B, E>
where
    B: RecallBackend,
    E: RecallEvents<B::Results> + 'static,
{
    /// Create an orchestrator that reports lifecycle events to `events`
    pub fn with_events(backend: B, events: E, config: OrchestratorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                events,
                config: Mutex::new(config),
                state: Mutex::new(RunState::new()),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Record the latest input text and (re)arm the debounce timer.
    ///
    /// Every call cancels whatever was previously scheduled; a new timer is
    /// armed only when the text passes the length gate and the duplicate
    /// filter. When the timer fires, the text recorded most recently is
    /// dispatched (last write wins).
    pub fn set_text(&self, text: Option<&str>) {
        let config = self.inner.config_snapshot();
        let normalized = query::normalize(text);

        let mut state = self.inner.lock_state();
        state.latest_text = text.map(str::to_owned);
        clear_timer(&mut state);

        if normalized.chars().count() < config.min_length {
            state.stats.skipped_short += 1;
            trace!(text = ?text, "input below minimum length, nothing scheduled");
            return;
        }
        if self.inner.should_skip(&mut state, &normalized) {
            return;
        }

        let generation = state.timer_generation;
        let debounce = config.debounce;
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            inner.fire_timer(generation);
        });
        state.timer = Some(handle.abort_handle());
        trace!(query = %normalized, debounce_ms = debounce.as_millis() as u64, "debounce timer armed");
    }

    /// Bypass the debounce timer and dispatch now.
    ///
    /// For explicit user actions (Enter, a search button) that should not
    /// wait out the quiet period. Still obeys the length gate, the duplicate
    /// filter, and in-flight dedup. With no text argument the most recently
    /// recorded text is dispatched.
    pub fn run_immediate(&self, text: Option<&str>) {
        let text = {
            let mut state = self.inner.lock_state();
            clear_timer(&mut state);
            match text {
                Some(text) => {
                    state.latest_text = Some(text.to_owned());
                    Some(text.to_owned())
                }
                None => state.latest_text.clone(),
            }
        };
        self.inner.dispatch(text.as_deref());
    }

    /// Abandon all scheduled and in-flight work.
    ///
    /// Clears any pending debounce timer, signals the in-flight lookup's
    /// cancellation token, and releases the in-flight slot immediately. The
    /// resulting rejection is swallowed; it never reaches the error
    /// callback.
    pub fn cancel(&self) {
        let mut state = self.inner.lock_state();
        clear_timer(&mut state);
        if let Some(in_flight) = state.in_flight.take() {
            debug!(query = %in_flight.query, "cancelling in-flight lookup");
            in_flight.cancel.cancel();
            // Invalidate the captured sequence so a late resolution from a
            // backend that ignores its token cannot pass the guard.
            self.inner.seq.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Read-only snapshot of the observable state
    pub fn state(&self) -> OrchestratorState<B::Results> {
        let state = self.inner.lock_state();
        OrchestratorState {
            latest_text: state.latest_text.clone(),
            last_completed_query: state.last_completed_query.clone(),
            last_results: state.last_results.clone(),
            in_flight_query: state.in_flight.as_ref().map(|f| f.query.clone()),
            is_in_flight: state.in_flight.is_some(),
            cache_size: state.cache.len(),
        }
    }

    /// Activity counters since construction
    pub fn stats(&self) -> OrchestratorStats {
        self.inner.lock_state().stats
    }

    /// Current configuration
    pub fn config(&self) -> OrchestratorConfig {
        self.inner.config_snapshot()
    }

    /// Merge a partial update into the live option set.
    ///
    /// Takes effect on the next input event; nothing is reconstructed.
    pub fn set_options(&self, patch: ConfigPatch) {
        self.inner.lock_config().apply(patch);
    }

    /// Empty the result cache
    pub fn clear_cache(&self) {
        self.inner.lock_state().cache.clear();
    }
}

struct Inner<B, E>
where
    B: RecallBackend,
{
    backend: B,
    events: E,
    config: Mutex<OrchestratorConfig>,
    state: Mutex<RunState<B::Results>>,
    /// Monotonic dispatch counter; exactly one value is current at a time.
    seq: AtomicU64,
}

/// Abort the pending debounce timer, if any, and invalidate fired-but-not-
/// yet-run timer continuations.
fn clear_timer<R>(state: &mut RunState<R>) {
    if let Some(timer) = state.timer.take() {
        timer.abort();
    }
    state.timer_generation += 1;
}

impl<B, E> Inner<B, E>
where
    B: RecallBackend,
    E: RecallEvents<B::Results> + 'static,
{
    fn lock_state(&self) -> MutexGuard<'_, RunState<B::Results>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_config(&self) -> MutexGuard<'_, OrchestratorConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn config_snapshot(&self) -> OrchestratorConfig {
        self.lock_config().clone()
    }

    /// Timer continuation: dispatch the recorded text unless a newer input
    /// event superseded this timer after its sleep already completed.
    fn fire_timer(self: &Arc<Self>, generation: u64) {
        let text = {
            let mut state = self.lock_state();
            if state.timer_generation != generation {
                trace!(generation, "debounce timer superseded, not dispatching");
                return;
            }
            state.timer = None;
            state.latest_text.clone()
        };
        self.dispatch(text.as_deref());
    }

    /// Exact and near-duplicate suppression. True means skip.
    fn should_skip(&self, state: &mut RunState<B::Results>, normalized: &str) -> bool {
        if let Some(in_flight) = &state.in_flight {
            if in_flight.query == normalized {
                state.stats.skipped_duplicate += 1;
                debug!(query = %normalized, "lookup already in flight, skipping");
                return true;
            }
        }
        if let Some(last) = state.last_dispatched.as_deref() {
            if last == normalized {
                state.stats.skipped_duplicate += 1;
                debug!(query = %normalized, "query already searched, skipping");
                return true;
            }
            if query::is_near_duplicate(normalized, last) {
                state.stats.skipped_near_duplicate += 1;
                debug!(query = %normalized, last = %last, "insufficient change since last lookup, skipping");
                return true;
            }
        }
        false
    }

    /// The dispatch path: gate, filter, cache probe, in-flight takeover,
    /// fetch spawn.
    fn dispatch(self: &Arc<Self>, text: Option<&str>) {
        let config = self.config_snapshot();
        let normalized = query::normalize(text);

        if normalized.chars().count() < config.min_length {
            self.lock_state().stats.skipped_short += 1;
            trace!(text = ?text, "input below minimum length, not dispatching");
            return;
        }

        let (cached, fetch) = {
            let mut state = self.lock_state();
            if self.should_skip(&mut state, &normalized) {
                return;
            }

            let cached = if config.use_cache {
                state.cache.get(&normalized, config.cache_ttl).cloned()
            } else {
                None
            };

            if let Some(results) = &cached {
                state.stats.cache_hits += 1;
                state.last_dispatched = Some(normalized.clone());
                state.last_completed_query = Some(normalized.clone());
                state.last_results = Some(results.clone());
            }

            let fetch = if cached.is_none() || config.refresh_on_cache {
                // A different lookup still in flight is superseded; its token
                // must fire before the new fetch begins.
                if let Some(superseded) = state.in_flight.take() {
                    debug!(
                        superseded = %superseded.query,
                        query = %normalized,
                        "cancelling superseded lookup"
                    );
                    superseded.cancel.cancel();
                }

                let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
                let cancel = CancellationToken::new();
                state.in_flight = Some(InFlight {
                    query: normalized.clone(),
                    cancel: cancel.clone(),
                    seq,
                });
                state.last_dispatched = Some(normalized.clone());
                state.stats.dispatched += 1;
                Some((seq, cancel))
            } else {
                None
            };

            (cached, fetch)
        };

        if let Some(results) = &cached {
            debug!(query = %normalized, "serving cached results");
            self.events.on_success(&normalized, results, true);
        }

        let Some((seq, cancel)) = fetch else {
            return;
        };

        self.events.on_start(&normalized);
        debug!(query = %normalized, seq, "dispatching recall lookup");

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = inner.backend.fetch(&normalized, cancel).await;
            inner.settle(&normalized, seq, outcome);
        });
    }

    /// Fetch continuation: apply the sequence guard, record the outcome,
    /// notify the observer.
    fn settle(&self, query: &str, seq: u64, outcome: FetchResult<B::Results>) {
        let is_current = seq == self.seq.load(Ordering::SeqCst);

        let mut state = self.lock_state();
        // Release the slot only if this attempt still owns it; a superseding
        // dispatch has already installed its own.
        if state.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            state.in_flight = None;
        }

        match outcome {
            Ok(results) if is_current => {
                state.cache.insert(query.to_owned(), results.clone());
                state.last_completed_query = Some(query.to_owned());
                state.last_results = Some(results.clone());
                drop(state);
                debug!(query = %query, seq, "lookup completed");
                self.events.on_success(query, &results, false);
            }
            Ok(_) => {
                state.stats.stale_discarded += 1;
                drop(state);
                debug!(query = %query, seq, "discarding superseded response");
            }
            Err(error) if error.is_cancelled() => {
                state.stats.cancelled += 1;
                drop(state);
                debug!(query = %query, seq, "lookup cancelled");
            }
            Err(error) if is_current => {
                state.stats.errors += 1;
                drop(state);
                debug!(query = %query, seq, error = %error, "lookup failed");
                self.events.on_error(query, &error);
            }
            Err(error) => {
                state.stats.stale_discarded += 1;
                drop(state);
                debug!(query = %query, seq, error = %error, "discarding superseded failure");
            }
        }

        self.events.on_settled(query);
    }
}
