use crate::error::{AnalysisClientError, Result};
use crate::transport::Transport;
use crate::types::TextFile;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One call observed by the mock transport
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    GetJson {
        path: String,
        query: Vec<(String, String)>,
    },
    GetBytes {
        path: String,
        query: Vec<(String, String)>,
    },
    PostMultipart {
        path: String,
        fields: Vec<(String, String)>,
        file_names: Vec<String>,
    },
    DeleteJson {
        path: String,
    },
}

/// Mock transport with scripted responses
///
/// JSON-returning calls (GET/POST/DELETE) consume from one shared queue
/// in the order they were scripted; binary GETs consume from their own.
/// Every call is recorded so tests can assert what went over the wire —
/// or that nothing did.
pub struct MockTransport {
    json_responses: Mutex<VecDeque<Result<Value>>>,
    bytes_responses: Mutex<VecDeque<Result<Vec<u8>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            json_responses: Mutex::new(VecDeque::new()),
            bytes_responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a successful JSON response
    #[must_use]
    pub fn with_json_response(self, value: Value) -> Self {
        self.json_responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(Ok(value));
        self
    }

    /// Script a failed JSON call
    #[must_use]
    pub fn with_json_failure(self, error: AnalysisClientError) -> Self {
        self.json_responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(Err(error));
        self
    }

    /// Script a successful binary response
    #[must_use]
    pub fn with_bytes_response(self, bytes: Vec<u8>) -> Self {
        self.bytes_responses
            .lock()
            .expect("mock lock poisoned")
            .push_back(Ok(bytes));
        self
    }

    /// Calls observed so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().expect("mock lock poisoned").push(call);
    }

    fn next_json(&self) -> Result<Value> {
        self.json_responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(AnalysisClientError::network(
                    "mock transport has no scripted response left",
                ))
            })
    }

    fn next_bytes(&self) -> Result<Vec<u8>> {
        self.bytes_responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(AnalysisClientError::network(
                    "mock transport has no scripted response left",
                ))
            })
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.record(RecordedCall::GetJson {
            path: path.to_string(),
            query: owned_pairs(query),
        });
        self.next_json()
    }

    async fn get_bytes(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.record(RecordedCall::GetBytes {
            path: path.to_string(),
            query: owned_pairs(query),
        });
        self.next_bytes()
    }

    async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[TextFile],
    ) -> Result<Value> {
        self.record(RecordedCall::PostMultipart {
            path: path.to_string(),
            fields: owned_pairs(fields),
            file_names: files.iter().map(|file| file.name.clone()).collect(),
        });
        self.next_json()
    }

    async fn delete_json(&self, path: &str) -> Result<Value> {
        self.record(RecordedCall::DeleteJson {
            path: path.to_string(),
        });
        self.next_json()
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Helper functions for creating test data
pub mod test_helpers {
    use crate::types::TextFile;
    use serde_json::{json, Value};

    pub fn text_file(name: &str, content: &str) -> TextFile {
        TextFile::new(name, content.as_bytes().to_vec())
    }

    /// A representative full result payload covering every analysis mode
    pub fn sample_result_payload() -> Value {
        json!({
            "stats": {
                "total_documents": 2,
                "total_entities": 14,
                "num_communities": 3,
                "avg_degree": 2.5
            },
            "entities": {
                "report.txt": {
                    "entities": {"Athens": "GPE", "Plato": "PERSON"},
                    "importance_scores": {"Athens": 0.9, "Plato": 0.7},
                    "entity_counts": {"GPE": 4, "PERSON": 3},
                    "network_path": "report_network.html"
                }
            },
            "scatter_plot": {"data": [], "layout": {"title": "Document Embeddings"}},
            "features_chart": {"data": [], "layout": {}},
            "similarity_heatmap": {"data": [], "layout": {}},
            "clusters": {"report.txt": 0, "notes.txt": 1},
            "network": {
                "report.txt": {
                    "community_members": {
                        "0": [
                            {"entity": "Athens", "type": "GPE"},
                            {"entity": "Greece", "type": "GPE"}
                        ]
                    },
                    "entities": {"Athens": "GPE", "Greece": "GPE"},
                    "network_path": "report_network.html"
                }
            }
        })
    }
}
