use thiserror::Error;

/// # Errors produced by [`Fetcher`](crate::fetch::Fetcher).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("error fetching URL: {url}, status code: {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Connection, protocol or body read failure.
    #[error("error fetching URL: {url}: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The fetch was cancelled before it completed.
    #[error("fetch canceled")]
    Canceled,

    /// A fetch worker task panicked or was aborted.
    #[error("fetch task failed: {reason}")]
    Task {
        /// Join error message.
        reason: String,
    },
}

impl FetchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Status { .. } => "fetch_status",
            FetchError::Transport { .. } => "fetch_transport",
            FetchError::Canceled => "fetch_canceled",
            FetchError::Task { .. } => "fetch_task",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FetchError::Status { url, status } => format!("url={url} status={status}"),
            FetchError::Transport { url, source } => format!("url={url} error={source}"),
            FetchError::Canceled => "canceled".to_string(),
            FetchError::Task { reason } => format!("task: {reason}"),
        }
    }

    /// True if this error only reflects a cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, FetchError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_names_url_and_code() {
        let err = FetchError::Status {
            url: "http://localhost/500".into(),
            status: 500,
        };
        assert!(err.to_string().starts_with("error fetching URL"));
        assert!(err.to_string().ends_with("status code: 500"));
        assert_eq!(err.as_label(), "fetch_status");
        assert_eq!(err.as_message(), "url=http://localhost/500 status=500");
        assert!(!err.is_canceled());
        assert!(FetchError::Canceled.is_canceled());
    }
}
