//! One network exchange per call
//!
//! The transport performs a single HTTP request with the configured
//! timeout and content encoding, and maps every failure into one of
//! three distinguishable shapes: a response with a non-success status
//! (carrying the status and any server-supplied detail), no response at
//! all, or a local failure before the request could be sent. It never
//! retries; that is the orchestrator's job.

use crate::config::ClientConfig;
use crate::error::{AnalysisClientError, Result};
use crate::types::TextFile;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
use std::future::Future;
use url::Url;

/// Seam between the facade and the HTTP layer
///
/// Implementations issue exactly one exchange per call. The mock in
/// `testing::mocks` records calls instead of touching the network.
pub trait Transport: Send + Sync {
    /// GET a JSON document
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> impl Future<Output = Result<Value>> + Send;

    /// GET a binary body
    fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// POST a multipart form of text fields plus file parts, expect JSON back
    fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[TextFile],
    ) -> impl Future<Output = Result<Value>> + Send;

    /// DELETE a resource, expect JSON back
    fn delete_json(&self, path: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Transport over a configured reqwest client
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport from configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(map_transport_error)?;
        let base_url = Url::parse(&config.base_url)?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(Into::into)
    }

    async fn read_json(response: Response) -> Result<Value> {
        let response = check_status(response).await?;
        response.json().await.map_err(map_transport_error)
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn get_bytes(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET (binary)");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(body.to_vec())
    }

    async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[TextFile],
    ) -> Result<Value> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str("text/plain")
                .map_err(map_transport_error)?;
            form = form.part("files", part);
        }

        let url = self.endpoint(path)?;
        tracing::debug!(%url, files = files.len(), "POST multipart");
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }

    async fn delete_json(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "DELETE");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_json(response).await
    }
}

/// Turn a non-success response into a typed failure carrying its detail
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(AnalysisClientError::status(
        code,
        extract_error_message(&body, code),
    ))
}

/// Pull human-readable detail out of an error body
///
/// The service reports errors as JSON with an `error` or `message` field;
/// anything else falls back to the (truncated) body, or to a friendly
/// status description when the body is empty.
fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(detail) = value.get(key).and_then(Value::as_str) {
                return detail.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        friendly_status_message(status)
    } else {
        truncate(trimmed, 200)
    }
}

fn friendly_status_message(status: u16) -> String {
    match status {
        400 => "Request contains invalid data or missing required fields".to_string(),
        404 => "Requested resource or endpoint not found".to_string(),
        500 => "Internal server error occurred".to_string(),
        502 => "Gateway error - upstream service not responding correctly".to_string(),
        503 => "Service temporarily unavailable".to_string(),
        504 => "Request timed out - service taking too long to respond".to_string(),
        _ => format!("Service returned status {} with no additional details", status),
    }
}

fn truncate(text: &str, max_length: usize) -> String {
    if text.len() <= max_length {
        text.to_string()
    } else {
        let cut = text
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= max_length)
            .last()
            .unwrap_or(0);
        format!("{}... (truncated)", &text[..cut])
    }
}

/// Map a reqwest failure onto the error taxonomy
///
/// A failure to even build the request is local; everything else here
/// means no usable response arrived.
fn map_transport_error(error: reqwest::Error) -> AnalysisClientError {
    if error.is_builder() {
        AnalysisClientError::validation(format!("failed to build request: {error}"))
    } else {
        AnalysisClientError::network(error.to_string())
    }
}
