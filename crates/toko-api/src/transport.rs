//! # HTTP Transport
//!
//! The single seam between the stores and the network.
//!
//! ## Design
//! Stores depend on `Arc<dyn Transport>`, never on reqwest directly.
//! `HttpTransport` is the production implementation; tests substitute an
//! in-memory implementation and drive the stores without a server.
//!
//! Every failure leaving this module is already classified into
//! [`ApiError`]; callers never see a raw reqwest error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Transport Trait
// =============================================================================

/// Object-safe async HTTP seam.
///
/// Paths are API-relative (`/cart`, `/transactions/5`). Query pairs are
/// appended verbatim; filter types decide upstream what gets sent.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> ApiResult<Value>;

    async fn post(&self, path: &str, body: Option<Value>) -> ApiResult<Value>;

    async fn put(&self, path: &str, body: Option<Value>) -> ApiResult<Value>;

    async fn delete(&self, path: &str) -> ApiResult<Value>;

    async fn post_multipart(&self, path: &str, form: MultipartForm) -> ApiResult<Value>;

    /// Installs or clears the bearer token attached to every request.
    async fn set_token(&self, token: Option<String>);
}

/// Typed helpers layered over the raw [`Transport`] methods.
#[async_trait]
pub trait TransportExt: Transport {
    async fn get_json<T>(&self, path: &str, query: &[(String, String)]) -> ApiResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.get(path, query).await?;
        serde_json::from_value(value).map_err(ApiError::decode)
    }

    async fn post_json<T>(&self, path: &str, body: Option<Value>) -> ApiResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.post(path, body).await?;
        serde_json::from_value(value).map_err(ApiError::decode)
    }

    async fn put_json<T>(&self, path: &str, body: Option<Value>) -> ApiResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.put(path, body).await?;
        serde_json::from_value(value).map_err(ApiError::decode)
    }

    async fn post_multipart_json<T>(&self, path: &str, form: MultipartForm) -> ApiResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.post_multipart(path, form).await?;
        serde_json::from_value(value).map_err(ApiError::decode)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> TransportExt for T {}

/// Serializes a request payload into a JSON body.
pub fn to_body<T: serde::Serialize>(payload: &T) -> ApiResult<Value> {
    serde_json::to_value(payload).map_err(ApiError::decode)
}

// =============================================================================
// Multipart Form
// =============================================================================

/// Transport-agnostic multipart form (file uploads, product images).
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }
}

// =============================================================================
// HTTP Transport
// =============================================================================

/// Production transport over `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl HttpTransport {
    /// Builds a transport from the client configuration.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        Self::with_base_url(&config.api.base_url, config.api.timeout_secs)
    }

    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> ApiResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ApiError::network(format!("Invalid base URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            base_url,
            token: RwLock::new(None),
        })
    }

    /// Resolves an API-relative path against the configured base URL.
    ///
    /// Joined manually because `Url::join` would drop the base path for
    /// absolute inputs like `/cart`.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let merged = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&merged);
        url
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> ApiResult<Value> {
        let request = match self.token.read().await.as_ref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::network("Request timed out")
            } else {
                ApiError::network("No response received from server")
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|_| ApiError::network("Failed to read response body"))?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if (200..300).contains(&status) {
            Ok(body.unwrap_or(Value::Null))
        } else {
            let err = ApiError::from_response(status, body.as_ref());
            debug!(status, kind = ?err.kind, "request failed");
            Err(err)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> ApiResult<Value> {
        debug!(path, "GET");
        let request = self.client.get(self.endpoint(path)).query(query);
        self.execute(request).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> ApiResult<Value> {
        debug!(path, "POST");
        let mut request = self.client.post(self.endpoint(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.execute(request).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> ApiResult<Value> {
        debug!(path, "PUT");
        let mut request = self.client.put(self.endpoint(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.execute(request).await
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        debug!(path, "DELETE");
        let request = self.client.delete(self.endpoint(path));
        self.execute(request).await
    }

    async fn post_multipart(&self, path: &str, form: MultipartForm) -> ApiResult<Value> {
        debug!(path, files = form.files.len(), "POST multipart");

        let mut multipart_form = multipart::Form::new();
        for (name, value) in form.fields {
            multipart_form = multipart_form.text(name, value);
        }
        for file in form.files {
            let part = multipart::Part::bytes(file.bytes)
                .file_name(file.filename)
                .mime_str(&file.content_type)
                .map_err(|e| ApiError::network(format!("Invalid upload content type: {}", e)))?;
            multipart_form = multipart_form.part(file.name, part);
        }

        let request = self.client.post(self.endpoint(path)).multipart(multipart_form);
        self.execute(request).await
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
