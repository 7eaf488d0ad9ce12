//! Search client configuration.

use std::time::Duration;

/// Search client configuration.
///
/// Carries the service endpoint and the two API keys: the admin key is used
/// for index management and document writes, the query key for read-only
/// searches and lookups. Keys are treated as opaque credentials and never
/// appear in log output or `Debug` formatting.
#[derive(Clone)]
pub struct SearchConfig {
    /// Service endpoint URL.
    pub endpoint: String,
    /// Admin API key (index and write privileges).
    pub admin_key: String,
    /// Query API key (read-only search privileges).
    pub query_key: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Consistency policy applied after batch uploads.
    pub consistency: ConsistencyPolicy,
}

impl SearchConfig {
    /// Create a new configuration for the given endpoint and key pair.
    pub fn new(
        endpoint: impl Into<String>,
        admin_key: impl Into<String>,
        query_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            admin_key: admin_key.into(),
            query_key: query_key.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            consistency: ConsistencyPolicy::default(),
        }
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the consistency policy applied after batch uploads.
    pub fn with_consistency(mut self, policy: ConsistencyPolicy) -> Self {
        self.consistency = policy;
        self
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("admin_key", &"<redacted>")
            .field("query_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("consistency", &self.consistency)
            .finish()
    }
}

/// How the client waits for newly written documents to become visible to
/// queries after a batch upload.
///
/// Hosted search services apply writes with an eventual-consistency window:
/// a successful upload does not guarantee the documents are immediately
/// searchable. The default reproduces the reference behavior of a fixed
/// two-second delay. `PollUntilVisible` is stronger: it polls the last
/// successfully written key until it can be read back or the timeout lapses.
/// A lapsed timeout degrades to having waited; it is not an error, since the
/// fixed delay gives no stronger guarantee either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyPolicy {
    /// Return immediately after the upload response.
    None,
    /// Sleep for a fixed interval before returning.
    FixedDelay(Duration),
    /// Poll the last written key until it is visible or the timeout lapses.
    PollUntilVisible {
        /// Interval between polls.
        interval: Duration,
        /// Maximum total time to wait.
        timeout: Duration,
    },
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        ConsistencyPolicy::FixedDelay(Duration::from_secs(2))
    }
}
