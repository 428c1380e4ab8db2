/// Configures HTTP timeout and decode-retry backoff behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Smallest delay between decode retries, in milliseconds.
    pub min_backoff_ms: u64,
    /// Largest delay between decode retries, in milliseconds.
    pub max_backoff_ms: u64,
    /// Growth factor applied per retry attempt.
    pub backoff_factor: f64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            min_backoff_ms: 100,
            max_backoff_ms: 10_000,
            backoff_factor: 2.0,
        }
    }
}
