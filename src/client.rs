//! Service-level and per-index clients.

use crate::action::{Batch, BatchResult};
use crate::config::{ConsistencyPolicy, SearchConfig};
use crate::document::Document;
use crate::error::{Result, SearchError};
use crate::index::IndexManager;
use crate::query::QuerySpec;
use crate::schema::Schema;
use crate::search::{self, SearchResults};
use crate::transport::{ApiRequest, HttpTransport, Transport};
use std::sync::Arc;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Service-level client, authenticated with the admin key.
///
/// Constructed once and passed around explicitly; there are no process-wide
/// singletons. Cloning is cheap and clones share the underlying transport.
#[derive(Clone)]
pub struct SearchClient {
    transport: Arc<dyn Transport>,
    config: Arc<SearchConfig>,
}

impl SearchClient {
    /// Create a client speaking HTTP to the configured endpoint.
    pub fn new(config: SearchConfig) -> Result<Self> {
        info!("Initializing search client for: {}", config.endpoint);
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client over an explicit transport.
    ///
    /// The seam for tests and for callers that bring their own channel to
    /// the service.
    pub fn with_transport(config: SearchConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    /// The client configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Index lifecycle operations.
    pub fn indexes(&self) -> IndexManager {
        IndexManager::new(self.transport.clone())
    }

    /// A handle for document and query operations against one index.
    ///
    /// The schema is the one the index was created with; it drives
    /// client-side query validation and key extraction.
    pub fn index(&self, name: impl Into<String>, schema: Schema) -> IndexClient {
        IndexClient {
            transport: self.transport.clone(),
            name: name.into(),
            schema,
            consistency: self.config.consistency.clone(),
        }
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("endpoint", &self.config.endpoint)
            .finish()
    }
}

/// Per-index client: batch uploads, searches, and key lookups.
#[derive(Clone)]
pub struct IndexClient {
    transport: Arc<dyn Transport>,
    name: String,
    schema: Schema,
    consistency: ConsistencyPolicy,
}

impl IndexClient {
    /// Name of the index this client addresses.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema the index was created with.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Override the consistency policy for this handle.
    pub fn with_consistency(mut self, policy: ConsistencyPolicy) -> Self {
        self.consistency = policy;
        self
    }

    // =========================================================================
    // Document Mutations
    // =========================================================================

    /// Submit a batch of mutations and report per-document outcomes.
    ///
    /// The batch travels as a single request. A whole-request failure
    /// (transport, auth) fails the call with [`SearchError::Service`] and no
    /// partial result. When the service accepts the batch but rejects some
    /// documents (under load, for instance), the returned [`BatchResult`]
    /// carries one entry per action in submission order, failed entries with
    /// their error message; the call itself still succeeds, and the caller
    /// may resubmit [`BatchResult::failed_keys`]. No per-document retry
    /// happens here.
    ///
    /// After a full or partial success the configured
    /// [`ConsistencyPolicy`] is applied before returning, covering the
    /// index's eventual-consistency window.
    pub async fn upload_batch(&self, batch: &Batch) -> Result<BatchResult> {
        if batch.is_empty() {
            return Ok(BatchResult::default());
        }

        // Every document must carry its key before anything hits the wire.
        let keys = batch.keys(&self.schema)?;
        debug!("Uploading batch of {} actions to {}", keys.len(), self.name);

        let response = self
            .transport
            .send(
                ApiRequest::post(format!("/indexes/{}/docs/index", self.name))
                    .body(batch.to_body()?),
            )
            .await?;

        let result = match response.status {
            404 => return Err(SearchError::IndexNotFound(self.name.clone())),
            // 207 means the batch was admitted but some documents failed;
            // both it and plain success carry per-action results.
            status if (200..300).contains(&status) => {
                BatchResult::from_response(&response.body)?
            }
            _ => return Err(SearchError::Service(response.error_message())),
        };

        if !result.all_succeeded() {
            warn!(
                "Failed to index some of the documents: {}",
                result.failed_keys().join(", ")
            );
        }

        self.await_consistency(result.last_succeeded_key()).await?;
        Ok(result)
    }

    /// Wait out the eventual-consistency window per the configured policy.
    ///
    /// Poll-until-visible treats lookup errors and a lapsed timeout as the
    /// end of the wait rather than failures; the policy is best-effort by
    /// nature and the fixed delay it replaces guarantees nothing stronger.
    async fn await_consistency(&self, last_key: Option<&str>) -> Result<()> {
        match &self.consistency {
            ConsistencyPolicy::None => {}
            ConsistencyPolicy::FixedDelay(delay) => {
                debug!("Waiting {:?} for documents to be indexed", delay);
                sleep(*delay).await;
            }
            ConsistencyPolicy::PollUntilVisible { interval, timeout } => {
                let Some(key) = last_key else {
                    return Ok(());
                };
                let deadline = Instant::now() + *timeout;
                loop {
                    match search::run_lookup(&self.transport, &self.name, key).await {
                        Ok(Some(_)) => break,
                        Ok(None) | Err(_) => {}
                    }
                    if Instant::now() + *interval > deadline {
                        debug!("Consistency poll timed out waiting for key {}", key);
                        break;
                    }
                    sleep(*interval).await;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Execute a search and materialize the first page of typed results.
    ///
    /// The spec is validated against the index schema before submission;
    /// filter, order-by, and select violations come back as
    /// [`SearchError::Query`] without a round trip.
    pub async fn search(&self, spec: &QuerySpec) -> Result<SearchResults> {
        spec.validate(&self.schema)?;
        search::run_search(&self.transport, &self.name, spec).await
    }

    /// Fetch a single document by its key value.
    ///
    /// Returns `None` when no such document is visible, which during the
    /// consistency window may include freshly written documents.
    pub async fn lookup(&self, key: &str) -> Result<Option<Document>> {
        search::run_lookup(&self.transport, &self.name, key).await
    }
}

impl std::fmt::Debug for IndexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexClient")
            .field("name", &self.name)
            .field("consistency", &self.consistency)
            .finish()
    }
}
