//! Seams to the surrounding system.
//!
//! The orchestrator owns scheduling, caching, and race handling; everything
//! else is injected through the two traits here:
//!
//! - [`RecallBackend`]: the one place a concrete network call and remote
//!   service contract exist
//! - [`RecallEvents`]: lifecycle notifications the UI layer renders

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::error::{FetchError, FetchResult};

/// The injected recall fetch.
///
/// Implementations own the transport and the remote service contract. Every
/// call receives a cancellation token; cancellation is cooperative, so the
/// implementation is responsible for propagating the token into the
/// transport and terminating its own work promptly once it fires, rejecting
/// with [`FetchError::Cancelled`].
#[async_trait]
pub trait RecallBackend: Send + Sync + 'static {
    /// Result list produced by the recall service.
    type Results: Clone + Send + Sync + 'static;

    /// Execute one lookup for a normalized query.
    async fn fetch(&self, query: &str, cancel: CancellationToken) -> FetchResult<Self::Results>;
}

/// Boxed future returned by [`fetch_fn`] closures.
pub type BoxFetchFuture<R> = Pin<Box<dyn Future<Output = FetchResult<R>> + Send>>;

/// Function-backed [`RecallBackend`] returned by [`fetch_fn`].
pub struct FnBackend<R, F> {
    fetch: F,
    _results: PhantomData<fn() -> R>,
}

/// Adapt a closure into a [`RecallBackend`], for callers that inject a plain
/// function instead of implementing the trait.
///
/// # Example
///
/// ```rust
/// use recall_client::backend::fetch_fn;
///
/// let backend = fetch_fn(|query: String, _cancel| -> recall_client::backend::BoxFetchFuture<Vec<String>> {
///     Box::pin(async move { Ok(vec![query]) })
/// });
/// # let _ = backend;
/// ```
pub fn fetch_fn<R, F>(fetch: F) -> FnBackend<R, F>
where
    R: Clone + Send + Sync + 'static,
    F: Fn(String, CancellationToken) -> BoxFetchFuture<R> + Send + Sync + 'static,
{
    FnBackend {
        fetch,
        _results: PhantomData,
    }
}

#[async_trait]
impl<R, F> RecallBackend for FnBackend<R, F>
where
    R: Clone + Send + Sync + 'static,
    F: Fn(String, CancellationToken) -> BoxFetchFuture<R> + Send + Sync + 'static,
{
    type Results = R;

    async fn fetch(&self, query: &str, cancel: CancellationToken) -> FetchResult<R> {
        (self.fetch)(query.to_owned(), cancel).await
    }
}

/// Lifecycle notifications delivered around each dispatched lookup.
///
/// All methods default to no-ops; implement only what the caller renders.
/// Notifications arrive on the task that resolved the attempt, never
/// concurrently for the same attempt.
pub trait RecallEvents<R>: Send + Sync {
    /// A live fetch is about to begin. Not fired for cache-only hits.
    fn on_start(&self, _query: &str) {}

    /// A completed attempt produced results.
    ///
    /// Cache hits report `from_cache = true`, including when a refresh
    /// fetch is still pending behind them.
    fn on_success(&self, _query: &str, _results: &R, _from_cache: bool) {}

    /// A live fetch failed for a reason other than cancellation.
    fn on_error(&self, _query: &str, _error: &FetchError) {}

    /// A dispatched attempt settled, on success and failure paths alike.
    ///
    /// Fired exactly once per dispatched attempt, after the in-flight slot
    /// is released; never fired for gated or deduped no-ops. Lets callers
    /// reset loading state deterministically.
    fn on_settled(&self, _query: &str) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl<R> RecallEvents<R> for NoopEvents {}
