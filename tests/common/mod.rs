//! In-process double for the remote search service.
//!
//! Implements the client's `Transport` seam with an in-memory index store so
//! the engine can be exercised end to end without a network: index
//! lifecycle, batch semantics (including merges and injected per-document
//! failures), and query evaluation over filters, ordering, projection, and
//! result caps.

use async_trait::async_trait;
use parking_lot::Mutex;
use searchlight::{
    ApiRequest, ApiResponse, ComparisonOp, Document, Field, Filter, IndexAction, KeyRole, Method,
    SortOrder, Transport,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Default)]
struct IndexState {
    fields: Vec<Field>,
    docs: BTreeMap<String, Document>,
}

impl IndexState {
    fn key_field(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.key)
            .map(|f| f.name.as_str())
            .unwrap_or("")
    }
}

#[derive(Default)]
struct State {
    indexes: BTreeMap<String, IndexState>,
    fail_keys: HashSet<String>,
}

/// In-memory search service reachable through the `Transport` trait.
#[derive(Default)]
pub struct InMemoryService {
    state: Mutex<State>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next batch action addressing `key` fail with a
    /// service-under-load rejection, as real services do under pressure.
    pub fn fail_next_for(&self, key: &str) {
        self.state.lock().fail_keys.insert(key.to_string());
    }
}

#[derive(Deserialize)]
struct OrderKey {
    field: String,
    direction: SortOrder,
}

#[async_trait]
impl Transport for InMemoryService {
    async fn send(&self, request: ApiRequest) -> searchlight::Result<ApiResponse> {
        let mut state = self.state.lock();
        let path = request.path.trim_matches('/').to_string();
        let segments: Vec<&str> = path.split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["indexes"]) => {
                let indexes: Vec<Value> = state
                    .indexes
                    .iter()
                    .map(|(name, index)| {
                        json!({ "name": name, "documentCount": index.docs.len() })
                    })
                    .collect();
                ok(json!({ "indexes": indexes }))
            }
            (Method::Get, ["indexes", name]) => match state.indexes.get(*name) {
                Some(index) => ok(json!({ "name": name, "fields": index.fields })),
                None => error(404, format!("index '{name}' was not found")),
            },
            (Method::Put, ["indexes", name]) => {
                if request.role != KeyRole::Admin {
                    return error(403, "the request is not authorized");
                }
                if state.indexes.contains_key(*name) {
                    return error(409, format!("index '{name}' already exists"));
                }
                let fields: Vec<Field> = match request
                    .body
                    .as_ref()
                    .and_then(|b| serde_json::from_value(b["fields"].clone()).ok())
                {
                    Some(fields) => fields,
                    None => return error(400, "index definition is missing fields"),
                };
                state.indexes.insert(
                    name.to_string(),
                    IndexState {
                        fields,
                        docs: BTreeMap::new(),
                    },
                );
                ok(json!({}))
            }
            (Method::Delete, ["indexes", name]) => {
                if request.role != KeyRole::Admin {
                    return error(403, "the request is not authorized");
                }
                match state.indexes.remove(*name) {
                    Some(_) => ok(json!({})),
                    None => error(404, format!("index '{name}' was not found")),
                }
            }
            (Method::Post, ["indexes", name, "docs", "index"]) => {
                if request.role != KeyRole::Admin {
                    return error(403, "the request is not authorized");
                }
                if !state.indexes.contains_key(*name) {
                    return error(404, format!("index '{name}' was not found"));
                }
                let actions: Vec<IndexAction> = match request
                    .body
                    .as_ref()
                    .and_then(|b| serde_json::from_value(b["actions"].clone()).ok())
                {
                    Some(actions) => actions,
                    None => return error(400, "batch is missing actions"),
                };
                apply_batch(&mut state, name, &actions)
            }
            (Method::Post, ["indexes", name, "docs", "search"]) => {
                let Some(index) = state.indexes.get(*name) else {
                    return error(404, format!("index '{name}' was not found"));
                };
                let Some(body) = request.body.as_ref() else {
                    return error(400, "search request is missing a body");
                };
                run_search(index, body)
            }
            (Method::Get, ["indexes", name, "docs", key]) => {
                let Some(index) = state.indexes.get(*name) else {
                    return error(404, format!("index '{name}' was not found"));
                };
                match index.docs.get(*key) {
                    Some(doc) => ok(serde_json::to_value(doc).unwrap()),
                    None => error(404, format!("document '{key}' was not found")),
                }
            }
            _ => error(400, format!("unrecognized request: {path}")),
        }
    }
}

fn apply_batch(
    state: &mut State,
    name: &str,
    actions: &[IndexAction],
) -> searchlight::Result<ApiResponse> {
    let mut results = Vec::with_capacity(actions.len());
    let mut any_failed = false;

    for action in actions {
        let key = {
            let index = state.indexes.get(name).unwrap();
            action.document().get_str(index.key_field()).map(str::to_string)
        };
        let Some(key) = key else {
            any_failed = true;
            results.push(json!({
                "key": "",
                "succeeded": false,
                "statusCode": 400,
                "errorMessage": "document is missing its key field",
            }));
            continue;
        };

        if state.fail_keys.remove(&key) {
            any_failed = true;
            results.push(json!({
                "key": key,
                "succeeded": false,
                "statusCode": 503,
                "errorMessage": "the service is under load, please try again later",
            }));
            continue;
        }

        let index = state.indexes.get_mut(name).unwrap();
        match action {
            IndexAction::Upload(doc) => {
                index.docs.insert(key.clone(), doc.clone());
            }
            IndexAction::MergeOrUpload(doc) => {
                if let Some(existing) = index.docs.get_mut(&key) {
                    for (field, value) in doc.fields() {
                        if !value.is_null() {
                            existing.insert(field, value.clone());
                        }
                    }
                } else {
                    index.docs.insert(key.clone(), doc.clone());
                }
            }
            IndexAction::Delete(_) => {
                index.docs.remove(&key);
            }
        }
        results.push(json!({ "key": key, "succeeded": true, "statusCode": 200 }));
    }

    Ok(ApiResponse {
        status: if any_failed { 207 } else { 200 },
        body: json!({ "results": results }),
    })
}

fn run_search(index: &IndexState, body: &Value) -> searchlight::Result<ApiResponse> {
    let text = body["search"].as_str().unwrap_or("*");
    let filter: Option<Filter> = body
        .get("filter")
        .map(|f| serde_json::from_value(f.clone()).expect("well-formed filter"));
    let order_by: Vec<OrderKey> = body
        .get("orderBy")
        .map(|o| serde_json::from_value(o.clone()).expect("well-formed orderBy"))
        .unwrap_or_default();
    let select: Option<Vec<String>> = body
        .get("select")
        .map(|s| serde_json::from_value(s.clone()).expect("well-formed select"));
    let top = body["top"].as_u64().map(|t| t as usize);

    let mut matches: Vec<Document> = index
        .docs
        .values()
        .filter(|doc| text_matches(text, doc, &index.fields))
        .filter(|doc| filter.as_ref().is_none_or(|f| eval_filter(f, doc)))
        .cloned()
        .collect();

    matches.sort_by(|a, b| {
        for key in &order_by {
            let ord = match (a.get(&key.field), b.get(&key.field)) {
                (Some(x), Some(y)) => cmp_values(x, y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            let ord = match key.direction {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    let total = matches.len();
    matches.truncate(top.unwrap_or(DEFAULT_PAGE_SIZE));

    let rows: Vec<Value> = matches
        .iter()
        .map(|doc| {
            let projected: Document = match &select {
                Some(select) => doc
                    .fields()
                    .filter(|(name, _)| select.iter().any(|s| s == name))
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
                None => doc.clone(),
            };
            serde_json::to_value(projected).unwrap()
        })
        .collect();

    ok(json!({ "results": rows, "total": total }))
}

fn text_matches(text: &str, doc: &Document, fields: &[Field]) -> bool {
    if text == "*" || text.is_empty() {
        return true;
    }
    let needle = text.to_lowercase();
    fields
        .iter()
        .filter(|f| f.searchable)
        .any(|f| match doc.get(&f.name) {
            Some(Value::String(s)) => s.to_lowercase().contains(&needle),
            Some(Value::Array(items)) => items
                .iter()
                .any(|v| v.as_str().is_some_and(|s| s.to_lowercase().contains(&needle))),
            _ => false,
        })
}

fn eval_filter(filter: &Filter, doc: &Document) -> bool {
    match filter {
        Filter::Compare { field, op, value } => {
            let Some(actual) = doc.get(field) else {
                return false;
            };
            let Some(ord) = cmp_values(actual, value) else {
                return false;
            };
            match op {
                ComparisonOp::Eq => ord == Ordering::Equal,
                ComparisonOp::Ne => ord != Ordering::Equal,
                ComparisonOp::Lt => ord == Ordering::Less,
                ComparisonOp::Le => ord != Ordering::Greater,
                ComparisonOp::Gt => ord == Ordering::Greater,
                ComparisonOp::Ge => ord != Ordering::Less,
            }
        }
        Filter::And(filters) => filters.iter().all(|f| eval_filter(f, doc)),
        Filter::Or(filters) => filters.iter().any(|f| eval_filter(f, doc)),
        Filter::Not(inner) => !eval_filter(inner, doc),
    }
}

fn cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn ok(body: Value) -> searchlight::Result<ApiResponse> {
    Ok(ApiResponse { status: 200, body })
}

fn error(status: u16, message: impl Into<String>) -> searchlight::Result<ApiResponse> {
    Ok(ApiResponse {
        status,
        body: json!({ "error": { "message": message.into() } }),
    })
}
