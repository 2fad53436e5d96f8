use thiserror::Error;

/// Failures raised by a [`crate::transport::Transport`] before any body is
/// handed to the locator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("rate limited by {url} (retry after {retry_after_secs:?}s)")]
    RateLimited {
        url: String,
        retry_after_secs: Option<u64>,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    /// Returns `true` for failures that may clear up on their own: timeouts,
    /// refused connections, 429 and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            Self::NotFound { .. } => false,
        }
    }
}

/// Why a page body could not be turned into a data blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// Zero-length or whitespace-only body; upstream throttling looks like this.
    #[error("empty body")]
    EmptyBody,
    #[error("no embedded data literal found")]
    NoCandidates,
    #[error("{count} embedded literal(s) failed to decode: {detail}")]
    Undecodable { count: usize, detail: String },
    #[error("no embedded literal matched the {shape} shape ({inspected} inspected)")]
    ShapeMismatch {
        shape: &'static str,
        inspected: usize,
    },
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed page for {context} [{fingerprint}]: {reason}")]
    MalformedPage {
        context: String,
        /// Short SHA-256 prefix plus byte length of the offending body.
        fingerprint: String,
        reason: MalformedReason,
    },

    #[error("{record} record is missing required field `{field}`")]
    IncompleteRecord {
        record: &'static str,
        field: &'static str,
        /// The blob the record was mapped from, kept for diagnostics.
        blob: Box<serde_json::Value>,
    },

    #[error("pagination limit reached for {context}: exceeded {max_pages} pages")]
    PaginationLimit { context: String, max_pages: usize },

    #[error("extraction cancelled")]
    Cancelled,

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl ScraperError {
    /// Returns `true` when retrying the same request could plausibly succeed.
    ///
    /// Only transport hiccups and empty (throttled) bodies qualify. A page
    /// whose structure did not match will not change shape on a retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_transient(),
            Self::MalformedPage { reason, .. } => *reason == MalformedReason::EmptyBody,
            Self::IncompleteRecord { .. }
            | Self::PaginationLimit { .. }
            | Self::Cancelled
            | Self::InvalidRequest { .. } => false,
        }
    }
}
