//! Index lifecycle management.

use crate::error::{Result, SearchError};
use crate::schema::{Field, Schema};
use crate::transport::{ApiRequest, Transport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Manager for creating and deleting indexes on the remote service.
///
/// Index creation is rare and schema-driven: callers hand over capability
/// metadata through [`Schema`] and never assemble wire-level field
/// definitions themselves. All operations authenticate with the admin key.
#[derive(Clone)]
pub struct IndexManager {
    transport: Arc<dyn Transport>,
}

impl IndexManager {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Check whether an index exists.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        debug!("Checking if index exists: {}", name);

        let response = self
            .transport
            .send(ApiRequest::get(format!("/indexes/{name}")))
            .await?;

        match response.status {
            404 => Ok(false),
            _ if response.is_success() => Ok(true),
            _ => Err(SearchError::Service(response.error_message())),
        }
    }

    /// Create an index with the given schema.
    ///
    /// Fails with [`SearchError::Conflict`] when an index with that name
    /// already exists, and [`SearchError::Schema`] when the service rejects
    /// the definition.
    pub async fn create(&self, name: &str, schema: &Schema) -> Result<()> {
        info!("Creating index: {}", name);

        let response = self
            .transport
            .send(ApiRequest::put(format!("/indexes/{name}")).body(schema.to_definition(name)))
            .await?;

        match response.status {
            409 => Err(SearchError::Conflict(name.to_string())),
            400 => Err(SearchError::Schema(response.error_message())),
            _ if response.is_success() => Ok(()),
            _ => Err(SearchError::Service(response.error_message())),
        }
    }

    /// Delete an index.
    ///
    /// Fails with [`SearchError::IndexNotFound`] when the index is absent;
    /// use [`delete_if_exists`](Self::delete_if_exists) for the idempotent
    /// form.
    pub async fn delete(&self, name: &str) -> Result<()> {
        info!("Deleting index: {}", name);

        let response = self
            .transport
            .send(ApiRequest::delete(format!("/indexes/{name}")))
            .await?;

        match response.status {
            404 => Err(SearchError::IndexNotFound(name.to_string())),
            _ if response.is_success() => Ok(()),
            _ => Err(SearchError::Service(response.error_message())),
        }
    }

    /// Delete an index when present; a no-op when absent.
    ///
    /// Idempotent: a second call observes the same state (index absent) and
    /// never errors.
    pub async fn delete_if_exists(&self, name: &str) -> Result<()> {
        if self.exists(name).await? {
            match self.delete(name).await {
                // Lost a race with a concurrent delete; the index is gone
                // either way.
                Err(SearchError::IndexNotFound(_)) => Ok(()),
                other => other,
            }
        } else {
            Ok(())
        }
    }

    /// Fetch the stored definition of an index.
    pub async fn get(&self, name: &str) -> Result<IndexDefinition> {
        debug!("Getting index: {}", name);

        let response = self
            .transport
            .send(ApiRequest::get(format!("/indexes/{name}")))
            .await?;

        match response.status {
            404 => Err(SearchError::IndexNotFound(name.to_string())),
            _ if response.is_success() => Ok(serde_json::from_value(response.body)?),
            _ => Err(SearchError::Service(response.error_message())),
        }
    }

    /// List all indexes on the service.
    pub async fn list(&self) -> Result<Vec<IndexInfo>> {
        let response = self.transport.send(ApiRequest::get("/indexes")).await?;

        if !response.is_success() {
            return Err(SearchError::Service(response.error_message()));
        }

        Ok(serde_json::from_value(response.body["indexes"].clone())?)
    }
}

impl std::fmt::Debug for IndexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexManager").finish()
    }
}

/// The stored definition of an index: its name and fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name.
    pub name: String,
    /// Field definitions in declaration order.
    pub fields: Vec<Field>,
}

impl IndexDefinition {
    /// Rebuild the validated schema from the stored fields.
    pub fn schema(&self) -> Result<Schema> {
        Schema::from_fields(self.fields.clone())
    }
}

/// Summary of an index as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Number of documents currently stored.
    #[serde(default)]
    pub document_count: u64,
}
