//! Async client for a document-analysis service
//!
//! This crate submits text files for analysis (entity recognition,
//! document embeddings, network communities), retrieves results with
//! bounded retry and exponential backoff, and normalizes the service's
//! loosely-shaped result payload into a fully populated
//! [`AnalysisResult`] that downstream code can consume without null
//! checks.
//!
//! ```no_run
//! use analysis_client::{
//!     AnalysisClient, AnalysisMode, ClientConfig, EmbeddingModel, ReductionMethod, TextFile,
//! };
//!
//! # async fn run() -> analysis_client::Result<()> {
//! let client = AnalysisClient::new(ClientConfig::new("http://localhost:5000"))?;
//!
//! let files = vec![TextFile::new("report.txt", "Plato taught in Athens.")];
//! let id = client
//!     .submit(
//!         &files,
//!         AnalysisMode::Comprehensive,
//!         EmbeddingModel::SentenceTransformer,
//!         ReductionMethod::Pca,
//!     )
//!     .await?;
//!
//! let result = client.fetch_result(&id).await?;
//! println!("{} entities found", result.stats.total_entities);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod types;

// Main functionality modules
pub mod classifier;
pub mod client;
pub mod result;
pub mod retry;
pub mod transport;
pub mod validation;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types for convenience
pub use classifier::{classify, RetryVerdict};
pub use client::AnalysisClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{AnalysisClientError, Result};
pub use result::{
    normalize, AnalysisResult, AnalysisStats, CommunityMember, FileEntities, FileNetwork,
};
pub use retry::{retry_with_policy, RetryPolicy};
pub use transport::{HttpTransport, Transport};
pub use types::{
    AnalysisMode, AnalysisSummary, EmbeddingModel, ExportFormat, ReductionMethod, SubmitResponse,
    TextFile,
};
pub use validation::MAX_FILE_SIZE_BYTES;
