//! Fetch error taxonomy.
//!
//! Every expected upstream failure mode is a value here; fetch errors never
//! cross the orchestrator boundary as panics and never abort a refresh.

use http::StatusCode;

/// A failed attempt to pull one source's data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// 401/403 — the credentials were rejected. Never retried.
    #[error("authentication rejected with status {status}")]
    Auth { status: u16 },

    /// Any other non-success HTTP status.
    #[error("upstream returned status {status}")]
    Status { status: u16 },

    /// Transport-level failure (connect, timeout, protocol).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response arrived but did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth {
                status: status.as_u16(),
            },
            _ => Self::Status {
                status: status.as_u16(),
            },
        }
    }

    /// Only timeouts, connect failures, and 5xx-class statuses are worth
    /// another attempt. Auth rejections and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Auth { .. } | Self::Malformed(_) => false,
            Self::Status { status } => *status >= 500,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
        }
    }
}
