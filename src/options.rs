/// Default retry budget for one logical call.
pub const DEFAULT_MAX_RETRIES: usize = 2;
/// Default linear backoff base in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 300;

/// Configures retry behavior of [`crate::ResilientClient::execute`].
///
/// Per-attempt timeouts live on the endpoint targets and request
/// descriptors, not here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Base retry backoff in milliseconds (linear strategy).
    pub retry_backoff_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}
