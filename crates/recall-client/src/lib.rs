//! recall-client - Client-side query orchestrator for the recall service
//!
//! This crate turns a high-frequency stream of input-change events
//! (keystrokes) into a small, correct set of recall lookups:
//!
//! - **query**: canonicalization and near-duplicate suppression
//! - **cache**: short-lived TTL memo of query results
//! - **orchestrator**: debouncing, in-flight tracking, cancellation, and
//!   the sequence guard against out-of-order responses
//! - **backend**: the injected fetch seam and lifecycle observer
//!
//! The orchestrator never issues more than one network call at a time,
//! never re-dispatches while the user is mid-word, and never lets a
//! superseded response clobber newer results.
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use recall_client::{FetchResult, OrchestratorConfig, QueryOrchestrator, RecallBackend};
//! use tokio_util::sync::CancellationToken;
//!
//! struct HttpRecall;
//!
//! #[async_trait]
//! impl RecallBackend for HttpRecall {
//!     type Results = Vec<String>;
//!
//!     async fn fetch(&self, query: &str, _cancel: CancellationToken) -> FetchResult<Vec<String>> {
//!         // A real implementation calls the recall service here and
//!         // propagates the token into the transport.
//!         Ok(vec![format!("result for {query}")])
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let orchestrator = QueryOrchestrator::new(HttpRecall, OrchestratorConfig::default());
//!
//!     // Wire to input events; the orchestrator decides what actually runs.
//!     orchestrator.set_text(Some("explain react hooks"));
//! }
//! ```

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod query;

// Re-export commonly used types
pub use backend::{fetch_fn, NoopEvents, RecallBackend, RecallEvents};
pub use config::{ConfigPatch, ConfigValidationError, OrchestratorConfig};
pub use error::{FetchError, FetchResult};
pub use orchestrator::{OrchestratorState, OrchestratorStats, QueryOrchestrator};
