//! Request/response channel to the remote service.
//!
//! The service is reached through the [`Transport`] trait, a black-box RPC
//! seam: one request in, one response out. [`HttpTransport`] is the
//! production implementation over a JSON/HTTP API; tests substitute an
//! in-process double.

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// PUT.
    Put,
    /// POST.
    Post,
    /// DELETE.
    Delete,
}

impl Method {
    /// Method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// Which credential authenticates a request.
///
/// Index management and document writes require the admin key; searches and
/// lookups use the read-only query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Admin key: index and write privileges.
    Admin,
    /// Query key: read-only search privileges.
    Query,
}

/// A single request to the service.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the service endpoint, e.g. `/indexes/hotels`.
    pub path: String,
    /// Credential role for this request.
    pub role: KeyRole,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            role: KeyRole::Admin,
            body: None,
        }
    }

    /// Authenticate with the given role. Defaults to admin.
    pub fn role(mut self, role: KeyRole) -> Self {
        self.role = role;
        self
    }

    /// Attach a JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response from the service: status code plus decoded JSON body.
///
/// Non-success statuses are not errors at this layer; each operation
/// triages them into the error taxonomy it owns.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body; an empty object when the service sent none.
    pub body: Value,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Service-supplied error message, or a placeholder.
    pub fn error_message(&self) -> String {
        self.body["error"]["message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string()
    }
}

/// Black-box RPC channel to the remote search service.
///
/// Implementations only fail for channel-level problems (connectivity,
/// timeouts); service-level failures travel back as [`ApiResponse`] status
/// codes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one round trip.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// JSON-over-HTTP transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    admin_key: String,
    query_key: String,
}

impl HttpTransport {
    /// Build a transport from the client configuration.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| SearchError::Service(format!("invalid endpoint: {e}")))?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchError::Service(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            admin_key: config.admin_key.clone(),
            query_key: config.query_key.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self
            .endpoint
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| SearchError::Service(format!("invalid request path: {e}")))?;

        debug!("{} {}", request.method.as_str(), request.path);

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let key = match request.role {
            KeyRole::Admin => &self.admin_key,
            KeyRole::Query => &self.query_key,
        };

        let mut builder = self.client.request(method, url).header("api-key", key);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::Service(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .unwrap_or(Value::Object(serde_json::Map::new()));

        Ok(ApiResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}
