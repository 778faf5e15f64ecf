//! Failure classification for the retry and fallback policy.

use std::time::Duration;

use crate::ApiError;

/// Statuses that route a failed call to the direct target.
pub const GATEWAY_STATUSES: [u16; 3] = [502, 503, 504];

/// Body fragments a reverse proxy emits when it cannot reach the backend.
const PROXY_ERROR_MARKERS: &[&str] = &[
    "error occurred while trying to proxy",
    "proxy error",
    "econnrefused",
    "econnreset",
];
const CONNECTION_REFUSED_MARKERS: &[&str] = &["econnrefused", "connection refused"];
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out"];

/// Outcome class of one failed attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// No response was received.
    NetworkUnreachable,
    /// The client-side timeout fired, or the error reads like one.
    TimedOut,
    /// 502, 503 or 504 from an intermediary.
    Gateway,
    /// Any other failure. Surfaced to the caller without retry.
    OtherHttp,
}

impl FailureKind {
    /// No response arrived, so a same-origin retry may get through.
    pub fn is_unreachable(self) -> bool {
        matches!(self, Self::NetworkUnreachable | Self::TimedOut)
    }

    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::OtherHttp)
    }
}

/// Maps an error to its [`FailureKind`]. Rules are checked in order:
/// received statuses first, then request-construction errors, then timeouts,
/// and every remaining transport error counts as unreachable.
pub fn classify(err: &ApiError) -> FailureKind {
    match err {
        ApiError::Http { status, .. } if GATEWAY_STATUSES.contains(status) => FailureKind::Gateway,
        ApiError::Http { .. } => FailureKind::OtherHttp,
        ApiError::Transport(inner) => {
            if inner.is_builder() {
                FailureKind::OtherHttp
            } else if inner.is_timeout() || reads_as_timeout(&err.cause_text()) {
                FailureKind::TimedOut
            } else {
                FailureKind::NetworkUnreachable
            }
        }
        ApiError::Decode(_) | ApiError::Encode(_) | ApiError::Config(_) => FailureKind::OtherHttp,
    }
}

/// Whether the direct target should be tried: a gateway status, a 502
/// carrying a proxy error page, or a refused connection.
pub fn is_gateway_failure(err: &ApiError) -> bool {
    match err {
        ApiError::Http { status, body, .. } => {
            GATEWAY_STATUSES.contains(status) || has_proxy_error_marker(*status, body)
        }
        ApiError::Transport(_) => reads_as_connection_refused(&err.cause_text()),
        _ => false,
    }
}

/// A 502 whose body is a reverse proxy's own error page.
pub fn has_proxy_error_marker(status: u16, body: &str) -> bool {
    status == 502 && contains_any(&body.to_lowercase(), PROXY_ERROR_MARKERS)
}

/// Linear backoff: `base_ms * attempt`.
pub fn backoff_delay(base_ms: u64, attempt: usize) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(attempt as u64))
}

fn reads_as_timeout(cause: &str) -> bool {
    contains_any(cause, TIMEOUT_MARKERS)
}

fn reads_as_connection_refused(cause: &str) -> bool {
    contains_any(cause, CONNECTION_REFUSED_MARKERS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
