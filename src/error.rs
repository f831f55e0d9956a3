//! Error types used by the synchronizer.
//!
//! [`SyncError`] covers every failure a caller can observe on the producer side
//! and during shutdown. Collaborator errors live next to their modules
//! (`fetch::FetchError`, `access_log::ParseError`).
//!
//! Like the other error types in this crate it provides `as_label` / `as_message`
//! helpers for logs and metrics.

use thiserror::Error;

/// # Errors produced by the synchronizer.
///
/// None of these are retried internally. A failed [`produce`](crate::Synchronizer::produce)
/// never alters messages that were already buffered.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The stream queue is full; the message was rejected.
    ///
    /// Treated as a sizing error: increase [`Config::capacity`](crate::Config::capacity)
    /// or drain faster.
    #[error("stream {stream} is full: {len}/{capacity} messages buffered")]
    CapacityExceeded {
        /// Index of the stream that rejected the message.
        stream: usize,
        /// Configured per-stream capacity.
        capacity: usize,
        /// Number of messages buffered when the call failed.
        len: usize,
    },

    /// Stream index outside `0..streams`.
    #[error("unknown stream {stream}; synchronizer has {streams} streams")]
    UnknownStream {
        /// Requested index.
        stream: usize,
        /// Number of configured streams.
        streams: usize,
    },

    /// The synchronizer was closed (hard stop or completed drain).
    #[error("synchronizer is closed")]
    Closed,

    /// `wait` was called on a lazily initialised handle that never started.
    #[error("synchronizer is not initialized")]
    Uninitialized,

    /// Construction was attempted outside of a tokio runtime.
    #[error("no tokio runtime available to start the coordinator")]
    NoRuntime,

    /// The coordinator stopped because the sink failed.
    #[error("sink failed: {reason}")]
    Sink {
        /// Underlying I/O error or panic message.
        reason: String,
    },
}

impl SyncError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lockstep::SyncError;
    ///
    /// let err = SyncError::CapacityExceeded { stream: 1, capacity: 8, len: 8 };
    /// assert_eq!(err.as_label(), "capacity_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SyncError::CapacityExceeded { .. } => "capacity_exceeded",
            SyncError::UnknownStream { .. } => "unknown_stream",
            SyncError::Closed => "closed",
            SyncError::Uninitialized => "uninitialized",
            SyncError::NoRuntime => "no_runtime",
            SyncError::Sink { .. } => "sink_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SyncError::CapacityExceeded {
                stream,
                capacity,
                len,
            } => format!("stream={stream} capacity={capacity} buffered={len}"),
            SyncError::UnknownStream { stream, streams } => {
                format!("stream={stream} streams={streams}")
            }
            SyncError::Closed => "closed".to_string(),
            SyncError::Uninitialized => "uninitialized".to_string(),
            SyncError::NoRuntime => "no tokio runtime".to_string(),
            SyncError::Sink { reason } => format!("sink: {reason}"),
        }
    }
}
