//! Error types for recall-client.

use thiserror::Error;

/// Result type alias for backend fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Failure modes of an injected recall fetch.
///
/// The orchestrator catches every one of these at its boundary; none escape
/// to the caller as panics or unhandled rejections. `Cancelled` is swallowed
/// entirely, everything else is reported through the error callback.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The fetch observed its cancellation token and aborted.
    #[error("fetch cancelled")]
    Cancelled,

    /// The backend gave up after its own deadline.
    #[error("fetch timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Any other transport or service failure.
    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

impl FetchError {
    /// Create a transport error from a message
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(anyhow::anyhow!(message.into()))
    }

    /// Create a timeout error
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Check if this error is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FetchError::transport("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert!(!err.is_cancelled());

        let err = FetchError::timeout(5000);
        assert!(err.is_timeout());
        assert!(err.to_string().contains("5000"));

        let err = FetchError::Cancelled;
        assert!(err.is_cancelled());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_transport_from_anyhow() {
        let err: FetchError = anyhow::anyhow!("socket closed").into();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(err.to_string().contains("socket closed"));
    }
}
