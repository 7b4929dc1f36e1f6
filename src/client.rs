//! Public entry points for the analysis service
//!
//! `AnalysisClient` composes the transport, the retry orchestrator, and
//! the result normalizer. Result fetches are retried because a job may
//! still be processing when first queried; submissions and deletions are
//! never retried (resending a submission could duplicate the job), and a
//! download is cheap for the caller to re-trigger.

use crate::classifier;
use crate::config::ClientConfig;
use crate::error::{AnalysisClientError, Result};
use crate::result::{self, AnalysisResult};
use crate::retry::{self, RetryPolicy};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    AnalysisMode, AnalysisSummary, EmbeddingModel, ExportFormat, ReductionMethod, SubmitResponse,
    TextFile,
};
use crate::validation;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Client for the document-analysis service
pub struct AnalysisClient<T = HttpTransport> {
    transport: T,
    retry: RetryPolicy,
}

impl AnalysisClient<HttpTransport> {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let retry = config.retry_policy();
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport, retry })
    }
}

impl<T: Transport> AnalysisClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy for result fetches
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Attach a cancellation token to result fetches
    ///
    /// Cancelling stops further retry attempts and interrupts backoff
    /// waits; callers that navigate away should cancel rather than leave
    /// retries running in the background.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.retry = self.retry.with_cancellation(token);
        self
    }

    /// Submit text files for analysis and return the server-assigned job id
    ///
    /// Local prechecks run before any network call; a submission that
    /// fails them is reported immediately. The network call itself is not
    /// retried: a submission is not idempotent.
    pub async fn submit(
        &self,
        files: &[TextFile],
        mode: AnalysisMode,
        embedding_model: EmbeddingModel,
        reduction_method: ReductionMethod,
    ) -> Result<String> {
        validation::validate_files(files)?;

        let fields = [
            ("analysis_type", mode.as_str()),
            ("embedding_type", embedding_model.as_str()),
            ("reduction_method", reduction_method.as_str()),
        ];
        let raw = self
            .transport
            .post_multipart("/api/analyze", &fields, files)
            .await?;

        let response: SubmitResponse = serde_json::from_value(raw)?;
        tracing::debug!(analysis_id = %response.analysis_id, "analysis submitted");
        Ok(response.analysis_id)
    }

    /// Fetch and normalize the result of a submitted analysis
    ///
    /// Transient failures (the job may still be processing) are retried
    /// per the configured policy; an unknown or expired id fails with a
    /// terminal not-found on the first attempt.
    pub async fn fetch_result(&self, analysis_id: &str) -> Result<AnalysisResult> {
        let path = format!("/api/results/{}", encode_id(analysis_id)?);
        let raw = retry::retry_with_policy(&self.retry, classifier::classify, || {
            self.transport.get_json(&path, &[])
        })
        .await?;
        result::normalize(raw)
    }

    /// Download an export of the analysis result
    ///
    /// Not retried: the download is user-triggered and re-requesting it
    /// is cheap.
    pub async fn fetch_download(&self, analysis_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        let path = format!("/api/download/{}", encode_id(analysis_id)?);
        self.transport
            .get_bytes(&path, &[("format", format.as_str())])
            .await
    }

    /// List summaries of all analyses known to the service
    pub async fn list_analyses(&self) -> Result<Vec<AnalysisSummary>> {
        let raw = self.transport.get_json("/api/analyses", &[]).await?;

        // The endpoint answers either a bare array or an object wrapping
        // it under "analyses"
        let entries = match raw {
            Value::Array(_) => raw,
            Value::Object(mut map) => map
                .remove("analyses")
                .unwrap_or_else(|| Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };

        serde_json::from_value(entries).map_err(Into::into)
    }

    /// Delete an analysis and its artifacts
    ///
    /// Not retried. Deleting an id that is already gone fails with the
    /// same terminal not-found as deleting one that never existed.
    pub async fn delete_analysis(&self, analysis_id: &str) -> Result<()> {
        let path = format!("/api/analysis/{}", encode_id(analysis_id)?);
        self.transport.delete_json(&path).await?;
        Ok(())
    }

    /// Probe service liveness
    ///
    /// `true` when the service answered and its `status` field (if any)
    /// reports healthy. Transport failures propagate so callers can tell
    /// "service said unhealthy" from "could not ask".
    pub async fn health_check(&self) -> Result<bool> {
        let raw = self.transport.get_json("/api/health", &[]).await?;
        let healthy = raw
            .get("status")
            .and_then(Value::as_str)
            .map(|status| {
                status.eq_ignore_ascii_case("ok") || status.eq_ignore_ascii_case("healthy")
            })
            .unwrap_or(true);
        Ok(healthy)
    }
}

/// Percent-encode a job id for use as a path segment
fn encode_id(analysis_id: &str) -> Result<String> {
    if analysis_id.trim().is_empty() {
        return Err(AnalysisClientError::validation(
            "analysis id must not be empty",
        ));
    }
    Ok(urlencoding::encode(analysis_id).into_owned())
}
