use thiserror::Error;
use std::path::PathBuf;

/// Result type alias for analysis client operations
pub type Result<T> = std::result::Result<T, AnalysisClientError>;

/// Comprehensive error types for analysis client operations
///
/// The variants form a closed taxonomy that retry handling branches on:
/// `Validation` and `ClientRequest` are terminal, `Server` and `Network`
/// are transient, `RetriesExhausted` wraps the last transient failure
/// once the attempt budget is spent.
#[derive(Debug, Error)]
pub enum AnalysisClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid input: {message}")]
    Validation { message: String },

    #[error("Request rejected with status {status}: {message}")]
    ClientRequest { status: u16, message: String },

    #[error("Server failed with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<AnalysisClientError>,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl AnalysisClientError {
    /// Create a new local validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new network error (no response received)
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an error from a non-success response status
    ///
    /// Status codes below 500 map to [`Self::ClientRequest`], everything
    /// else to [`Self::Server`].
    pub fn status<S: Into<String>>(status: u16, message: S) -> Self {
        if status < 500 {
            Self::ClientRequest {
                status,
                message: message.into(),
            }
        } else {
            Self::Server {
                status,
                message: message.into(),
            }
        }
    }

    /// Wrap the last transient failure after the attempt budget is spent
    pub fn retries_exhausted(attempts: u32, source: AnalysisClientError) -> Self {
        Self::RetriesExhausted {
            attempts,
            source: Box::new(source),
        }
    }

    /// The HTTP status carried by this failure, if a response was received
    pub fn response_status(&self) -> Option<u16> {
        match self {
            Self::ClientRequest { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::RetriesExhausted { source, .. } => source.response_status(),
            _ => None,
        }
    }

    /// Whether this failure means the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.response_status() == Some(404)
    }
}
