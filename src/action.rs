//! Batch mutations and per-document outcomes.

use crate::document::Document;
use crate::error::Result;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single document mutation within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "document", rename_all = "camelCase")]
pub enum IndexAction {
    /// Replace or create the full document.
    Upload(Document),
    /// Create the document if absent, otherwise merge non-null fields into
    /// the existing document.
    MergeOrUpload(Document),
    /// Remove the document identified by the key field; other fields are
    /// ignored.
    Delete(Document),
}

impl IndexAction {
    /// Upload action.
    pub fn upload(document: Document) -> Self {
        IndexAction::Upload(document)
    }

    /// Merge-or-upload action.
    pub fn merge_or_upload(document: Document) -> Self {
        IndexAction::MergeOrUpload(document)
    }

    /// Delete action for the document carrying the given key value.
    pub fn delete(document: Document) -> Self {
        IndexAction::Delete(document)
    }

    /// The document payload.
    pub fn document(&self) -> &Document {
        match self {
            IndexAction::Upload(doc)
            | IndexAction::MergeOrUpload(doc)
            | IndexAction::Delete(doc) => doc,
        }
    }
}

/// An ordered group of mutations submitted as one request.
///
/// The batch is one round trip, but each action succeeds or fails
/// independently; see [`BatchResult`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    actions: Vec<IndexAction>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action.
    pub fn push(&mut self, action: IndexAction) {
        self.actions.push(action);
    }

    /// Build a batch that uploads every document.
    pub fn upload_all(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            actions: documents.into_iter().map(IndexAction::Upload).collect(),
        }
    }

    /// Build a batch that merge-or-uploads every document.
    pub fn merge_or_upload_all(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            actions: documents
                .into_iter()
                .map(IndexAction::MergeOrUpload)
                .collect(),
        }
    }

    /// Actions in submission order.
    pub fn actions(&self) -> &[IndexAction] {
        &self.actions
    }

    /// Number of actions in the batch.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the batch carries no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Collect the key of every action, validating that each document
    /// carries one.
    pub(crate) fn keys(&self, schema: &Schema) -> Result<Vec<String>> {
        self.actions
            .iter()
            .map(|a| a.document().key_value(schema))
            .collect()
    }

    /// Serialize the batch as a request body.
    pub(crate) fn to_body(&self) -> Result<Value> {
        Ok(serde_json::json!({ "actions": self.actions }))
    }
}

impl FromIterator<IndexAction> for Batch {
    fn from_iter<I: IntoIterator<Item = IndexAction>>(iter: I) -> Self {
        Batch {
            actions: iter.into_iter().collect(),
        }
    }
}

/// Outcome of one action within a batch, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingResult {
    /// Key of the document the action addressed.
    pub key: String,
    /// Whether the action was applied.
    pub succeeded: bool,
    /// Service-supplied reason when the action failed.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Per-action status code reported by the service.
    #[serde(default)]
    pub status_code: u16,
}

/// Per-document outcomes of a batch upload.
///
/// A partially failed batch is not an error: the service commonly rejects
/// individual documents under load while accepting the rest, and the caller
/// decides whether to resubmit the failed subset. Whole-request failures
/// surface as [`SearchError::Service`](crate::SearchError::Service) instead
/// and carry no partial result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    results: Vec<IndexingResult>,
}

impl BatchResult {
    /// Per-action outcomes in submission order.
    pub fn results(&self) -> &[IndexingResult] {
        &self.results
    }

    /// Whether every action succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    /// Keys of the actions that failed, for resubmission.
    pub fn failed_keys(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| r.key.as_str())
            .collect()
    }

    /// Key of the last action that succeeded, if any.
    pub(crate) fn last_succeeded_key(&self) -> Option<&str> {
        self.results
            .iter()
            .rev()
            .find(|r| r.succeeded)
            .map(|r| r.key.as_str())
    }

    /// Number of outcomes, one per submitted action.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the batch produced no outcomes.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Decode the service response body.
    pub(crate) fn from_response(body: &Value) -> Result<Self> {
        let results: Vec<IndexingResult> = serde_json::from_value(body["results"].clone())?;
        Ok(Self { results })
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a IndexingResult;
    type IntoIter = std::slice::Iter<'a, IndexingResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actions_tag_their_kind_on_the_wire() {
        let batch = Batch::from_iter([
            IndexAction::upload(Document::new().field("id", "1")),
            IndexAction::merge_or_upload(Document::new().field("id", "2")),
            IndexAction::delete(Document::new().field("id", "3")),
        ]);
        let body = batch.to_body().unwrap();
        let actions = body["actions"].as_array().unwrap();
        assert_eq!(actions[0]["action"], "upload");
        assert_eq!(actions[1]["action"], "mergeOrUpload");
        assert_eq!(actions[2]["action"], "delete");
        assert_eq!(actions[2]["document"]["id"], "3");
    }

    #[test]
    fn decodes_partial_failure_response() {
        let body = json!({
            "results": [
                { "key": "1", "succeeded": true, "statusCode": 200 },
                { "key": "2", "succeeded": false, "statusCode": 503,
                  "errorMessage": "the service is under load" },
                { "key": "3", "succeeded": true, "statusCode": 200 },
            ]
        });
        let result = BatchResult::from_response(&body).unwrap();
        assert_eq!(result.len(), 3);
        assert!(!result.all_succeeded());
        assert_eq!(result.failed_keys(), vec!["2"]);
        assert_eq!(result.last_succeeded_key(), Some("3"));
        assert_eq!(
            result.results()[1].error_message.as_deref(),
            Some("the service is under load")
        );
    }
}
