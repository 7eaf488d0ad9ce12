//! Search execution and result materialization.

use crate::document::Document;
use crate::error::{Result, SearchError};
use crate::query::QuerySpec;
use crate::transport::{ApiRequest, KeyRole, Transport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The first page of results for one search call.
///
/// Rows are materialized as [`Document`]s, narrowed to the query's `select`
/// set when one was given. Fetching beyond the first page is out of scope;
/// `top` is the only result-count control.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Matching documents in service order.
    pub documents: Vec<Document>,
    /// Total number of matching documents, when the service reports it.
    pub total: Option<u64>,
}

impl SearchResults {
    /// Number of returned documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the page is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over the returned documents.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Decode every document into a typed value.
    ///
    /// With a `select` projection in play the target type's remaining fields
    /// must be optional or defaulted.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.documents.iter().map(Document::to_typed).collect()
    }
}

impl<'a> IntoIterator for &'a SearchResults {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Submit a validated query and materialize the response rows.
pub(crate) async fn run_search(
    transport: &Arc<dyn Transport>,
    index: &str,
    spec: &QuerySpec,
) -> Result<SearchResults> {
    debug!("Searching index {}: '{}'", index, spec.text);

    let response = transport
        .send(
            ApiRequest::post(format!("/indexes/{index}/docs/search"))
                .role(KeyRole::Query)
                .body(spec.to_body()?),
        )
        .await?;

    match response.status {
        404 => return Err(SearchError::IndexNotFound(index.to_string())),
        400 => return Err(SearchError::Query(response.error_message())),
        _ if response.is_success() => {}
        _ => return Err(SearchError::Service(response.error_message())),
    }

    let rows = match response.body.get("results") {
        Some(Value::Array(rows)) => rows.clone(),
        _ => Vec::new(),
    };

    let documents = rows
        .into_iter()
        .map(Document::from_value)
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResults {
        documents,
        total: response.body["total"].as_u64(),
    })
}

/// Fetch a single document by key; `None` when it is not (yet) visible.
pub(crate) async fn run_lookup(
    transport: &Arc<dyn Transport>,
    index: &str,
    key: &str,
) -> Result<Option<Document>> {
    debug!("Looking up document {} in index {}", key, index);

    let response = transport
        .send(ApiRequest::get(format!("/indexes/{index}/docs/{key}")).role(KeyRole::Query))
        .await?;

    match response.status {
        404 => Ok(None),
        _ if response.is_success() => Ok(Some(Document::from_value(response.body)?)),
        _ => Err(SearchError::Service(response.error_message())),
    }
}
