use crate::error::{AnalysisClientError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default per-call timeout, generous enough for large-payload processing
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
/// Default maximum attempt count for retried result fetches
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default backoff base delay in milliseconds
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Default backoff delay ceiling in milliseconds
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;

/// Client configuration for the analysis service
///
/// Unset optional fields fall back to the defaults above, so a config
/// only needs the base URL:
///
/// ```
/// use analysis_client::ClientConfig;
///
/// let config = ClientConfig::new("http://localhost:5000");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the analysis service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
    /// Maximum attempt count for retried result fetches
    pub max_retry_attempts: Option<u32>,
    /// Backoff base delay in milliseconds
    pub retry_base_delay_ms: Option<u64>,
    /// Backoff delay ceiling in milliseconds
    pub retry_max_delay_ms: Option<u64>,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the base URL
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: None,
            max_retry_attempts: None,
            retry_base_delay_ms: None,
            retry_max_delay_ms: None,
        }
    }

    /// Create a config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(AnalysisClientError::ConfigNotFound {
                path: path_ref.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path_ref).map_err(AnalysisClientError::Io)?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(AnalysisClientError::validation("base URL must not be empty"));
        }

        let url = Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AnalysisClientError::validation(format!(
                "unsupported URL scheme '{}' in base URL",
                url.scheme()
            )));
        }

        if self.timeout_seconds == Some(0) {
            return Err(AnalysisClientError::validation("timeout must be non-zero"));
        }
        if self.max_retry_attempts == Some(0) {
            return Err(AnalysisClientError::validation(
                "max retry attempts must be non-zero",
            ));
        }

        Ok(())
    }

    /// Per-call timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    /// Retry policy derived from this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retry_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            Duration::from_millis(self.retry_base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS)),
            Duration::from_millis(self.retry_max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS)),
        )
    }
}

/// Builder for ClientConfig to improve API ergonomics
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self {
            config: ClientConfig::new(""),
        }
    }

    /// Set the base URL of the analysis service
    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the per-call timeout in seconds
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = Some(seconds);
        self
    }

    /// Set the maximum attempt count for retried result fetches
    #[must_use]
    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.config.max_retry_attempts = Some(attempts);
        self
    }

    /// Set the backoff base delay in milliseconds
    #[must_use]
    pub fn retry_base_delay_ms(mut self, millis: u64) -> Self {
        self.config.retry_base_delay_ms = Some(millis);
        self
    }

    /// Set the backoff delay ceiling in milliseconds
    #[must_use]
    pub fn retry_max_delay_ms(mut self, millis: u64) -> Self {
        self.config.retry_max_delay_ms = Some(millis);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
