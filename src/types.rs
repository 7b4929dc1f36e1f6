use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A text document queued for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    /// File name sent to the service, e.g. `report.txt`
    pub name: String,
    /// Raw file content
    pub bytes: Vec<u8>,
}

impl TextFile {
    /// Create a file from a name and its content
    pub fn new<S: Into<String>, B: Into<Vec<u8>>>(name: S, bytes: B) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Content size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Which analysis stages the service should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Named entity recognition only
    EnhancedNer,
    /// Document embeddings and clustering only
    EnhancedEmbeddings,
    /// Entity relationship networks only
    EnhancedNetwork,
    /// All analysis stages
    Comprehensive,
}

impl AnalysisMode {
    /// Wire value used in the submission form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnhancedNer => "enhanced_ner",
            Self::EnhancedEmbeddings => "enhanced_embeddings",
            Self::EnhancedNetwork => "enhanced_network",
            Self::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embedding model used for the embeddings stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingModel {
    SentenceTransformer,
    #[serde(rename = "doc2vec")]
    Doc2Vec,
}

impl EmbeddingModel {
    /// Wire value used in the submission form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SentenceTransformer => "sentence_transformer",
            Self::Doc2Vec => "doc2vec",
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensionality-reduction method for the 2D embedding projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionMethod {
    Pca,
    Tsne,
    Umap,
}

impl ReductionMethod {
    /// Wire value used in the submission form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pca => "pca",
            Self::Tsne => "tsne",
            Self::Umap => "umap",
        }
    }
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export format for result downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Wire value used in the download query string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response to a successful submission
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitResponse {
    /// Server-assigned opaque job identifier
    pub analysis_id: String,
    /// Fields the server sent that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the list-analyses response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisSummary {
    /// Server-assigned opaque job identifier
    pub analysis_id: String,
    /// Analysis mode the job was submitted with
    pub analysis_type: Option<String>,
    /// Number of documents in the submission
    pub num_documents: Option<u64>,
    /// Submission timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Fields the server sent that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_match_serde_names() {
        for mode in [
            AnalysisMode::EnhancedNer,
            AnalysisMode::EnhancedEmbeddings,
            AnalysisMode::EnhancedNetwork,
            AnalysisMode::Comprehensive,
        ] {
            let encoded = serde_json::to_value(mode).unwrap();
            assert_eq!(encoded, Value::String(mode.as_str().to_string()));
        }

        for model in [EmbeddingModel::SentenceTransformer, EmbeddingModel::Doc2Vec] {
            let encoded = serde_json::to_value(model).unwrap();
            assert_eq!(encoded, Value::String(model.as_str().to_string()));
        }

        for method in [
            ReductionMethod::Pca,
            ReductionMethod::Tsne,
            ReductionMethod::Umap,
        ] {
            let encoded = serde_json::to_value(method).unwrap();
            assert_eq!(encoded, Value::String(method.as_str().to_string()));
        }
    }

    #[test]
    fn test_summary_tolerates_unknown_fields() {
        let raw = serde_json::json!({
            "analysis_id": "abc-123",
            "analysis_type": "comprehensive",
            "num_documents": 4,
            "owner": "research-team"
        });

        let summary: AnalysisSummary = serde_json::from_value(raw).unwrap();
        assert_eq!(summary.analysis_id, "abc-123");
        assert_eq!(summary.num_documents, Some(4));
        assert_eq!(
            summary.extra.get("owner").and_then(Value::as_str),
            Some("research-team")
        );
    }

    #[test]
    fn test_text_file_size() {
        let file = TextFile::new("a.txt", "hello");
        assert_eq!(file.size(), 5);
    }
}
