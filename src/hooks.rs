//! Pre- and post-attempt hooks.
//!
//! Hooks observe every attempt, including fallback attempts. They return
//! nothing and receive only shared references, so they cannot change the
//! outcome of a call.

use std::time::Duration;

use reqwest::Method;

use crate::{ApiError, ApiResponse, TargetKind};

/// What is about to be sent, or was just sent.
#[derive(Clone, Debug)]
pub struct AttemptInfo<'a> {
    pub target: TargetKind,
    /// Retry iteration of the logical call, starting at 0. Fallback
    /// attempts share the iteration of the primary attempt that failed.
    pub attempt: usize,
    pub method: &'a Method,
    pub url: &'a str,
    pub base_url: &'a str,
    pub timeout: Duration,
}

/// Observer invoked around each attempt.
pub trait RequestHook: Send + Sync {
    fn before_attempt(&self, _info: &AttemptInfo<'_>) {}

    fn after_attempt(&self, _info: &AttemptInfo<'_>, _outcome: Result<&ApiResponse, &ApiError>) {}
}

/// Logs every attempt through `tracing`. Installed by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHook;

impl RequestHook for TracingHook {
    fn before_attempt(&self, info: &AttemptInfo<'_>) {
        tracing::debug!(
            target_kind = %info.target,
            attempt = info.attempt,
            method = %info.method,
            url = %info.url,
            base_url = %info.base_url,
            timeout_ms = info.timeout.as_millis() as u64,
            "sending request"
        );
    }

    fn after_attempt(&self, info: &AttemptInfo<'_>, outcome: Result<&ApiResponse, &ApiError>) {
        match outcome {
            Ok(response) => tracing::debug!(
                target_kind = %info.target,
                attempt = info.attempt,
                url = %info.url,
                status = response.status,
                "response received"
            ),
            Err(err) => tracing::warn!(
                target_kind = %info.target,
                attempt = info.attempt,
                url = %info.url,
                status = ?err.status(),
                body = err.body().unwrap_or_default(),
                error = %err,
                "request failed"
            ),
        }
    }
}
