//! Typed view of an analysis result payload
//!
//! The service's result shape is loosely structured: every top-level key
//! is optional because each analysis mode populates a different subset.
//! [`normalize`] converts that "maybe absent" payload into a fully
//! populated [`AnalysisResult`] so downstream consumers never null-check:
//! absent maps become empty maps, absent counters become zeros, and
//! unrecognized fields pass through untouched.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Type tag assigned to entities that appear only in a derived summary
/// (importance scores or counts) and not in the full entity map
pub const UNKNOWN_ENTITY_TYPE: &str = "UNKNOWN";

/// Aggregate counters across the whole analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisStats {
    pub total_documents: u64,
    pub total_entities: u64,
    pub num_communities: u64,
    pub avg_degree: f64,
    /// Fields the server sent that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-file entity recognition record
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FileEntities {
    /// Every recognized entity and its type tag
    pub entities: HashMap<String, String>,
    /// Normalized importance per entity, in [0, 1]
    pub importance_scores: HashMap<String, f64>,
    /// Occurrence counts keyed the way the server groups them
    pub entity_counts: HashMap<String, u64>,
    /// Link to a rendered per-file network artifact, when present
    pub network_path: Option<String>,
    /// Chart specifications for per-file entity visualizations
    pub visualizations: Option<Value>,
    /// Fields the server sent that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One member of a detected community
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommunityMember {
    /// Entity label; never empty after normalization
    pub entity: String,
    /// Entity type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Fields the server sent that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-file network analysis record
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FileNetwork {
    /// Community id to its members, in server order
    pub community_members: HashMap<u32, Vec<CommunityMember>>,
    /// Every entity in the network and its type tag
    pub entities: HashMap<String, String>,
    /// Link to a rendered network artifact, when present
    pub network_path: Option<String>,
    /// Fields the server sent that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fully populated analysis result
///
/// Every field is present-or-empty; consumers branch on `is_empty()` of
/// the maps rather than null-checking.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisResult {
    pub stats: AnalysisStats,
    /// Source filename to its entity record
    pub entities: HashMap<String, FileEntities>,
    /// 2D scatter-plot specification for document embeddings
    pub scatter_plot: Option<Value>,
    /// Feature-comparison chart specification
    pub features_chart: Option<Value>,
    /// Pairwise document-similarity matrix specification
    pub similarity_heatmap: Option<Value>,
    /// Source filename to its cluster index
    pub clusters: HashMap<String, u32>,
    /// Source filename to its network record
    pub network: HashMap<String, FileNetwork>,
    /// Top-level fields the server sent that this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisResult {
    /// Whether the payload carried no analysis output at all
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.clusters.is_empty()
            && self.network.is_empty()
            && self.scatter_plot.is_none()
            && self.features_chart.is_none()
            && self.similarity_heatmap.is_none()
    }
}

/// Raw serde view of the result payload: everything optional
#[derive(Debug, Default, Deserialize)]
struct RawAnalysisResult {
    stats: Option<RawStats>,
    entities: Option<HashMap<String, RawFileEntities>>,
    scatter_plot: Option<Value>,
    features_chart: Option<Value>,
    similarity_heatmap: Option<Value>,
    clusters: Option<HashMap<String, u32>>,
    network: Option<HashMap<String, RawFileNetwork>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStats {
    total_documents: Option<u64>,
    total_entities: Option<u64>,
    num_communities: Option<u64>,
    avg_degree: Option<f64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFileEntities {
    entities: Option<HashMap<String, String>>,
    importance_scores: Option<HashMap<String, f64>>,
    entity_counts: Option<HashMap<String, u64>>,
    network_path: Option<String>,
    visualizations: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFileNetwork {
    community_members: Option<HashMap<u32, Vec<CommunityMember>>>,
    entities: Option<HashMap<String, String>>,
    network_path: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Normalize a raw result payload into a fully populated [`AnalysisResult`]
///
/// Pure transformation: no I/O, deterministic, idempotent. Deserialization
/// failures (a negative community id, a non-object payload) surface as
/// typed JSON errors rather than being silently dropped.
pub fn normalize(raw: Value) -> Result<AnalysisResult> {
    let raw: RawAnalysisResult = serde_json::from_value(raw)?;

    Ok(AnalysisResult {
        stats: normalize_stats(raw.stats.unwrap_or_default()),
        entities: raw
            .entities
            .unwrap_or_default()
            .into_iter()
            .map(|(file, record)| (file, normalize_file_entities(record)))
            .collect(),
        scatter_plot: none_if_null(raw.scatter_plot),
        features_chart: none_if_null(raw.features_chart),
        similarity_heatmap: none_if_null(raw.similarity_heatmap),
        clusters: raw.clusters.unwrap_or_default(),
        network: raw
            .network
            .unwrap_or_default()
            .into_iter()
            .map(|(file, record)| (file, normalize_file_network(record)))
            .collect(),
        extra: raw.extra,
    })
}

fn normalize_stats(raw: RawStats) -> AnalysisStats {
    AnalysisStats {
        total_documents: raw.total_documents.unwrap_or(0),
        total_entities: raw.total_entities.unwrap_or(0),
        num_communities: raw.num_communities.unwrap_or(0),
        avg_degree: raw.avg_degree.unwrap_or(0.0),
        extra: raw.extra,
    }
}

fn normalize_file_entities(raw: RawFileEntities) -> FileEntities {
    let mut entities: HashMap<String, String> = raw
        .entities
        .unwrap_or_default()
        .into_iter()
        .filter(|(label, _)| !label.is_empty())
        .collect();

    let importance_scores: HashMap<String, f64> = raw
        .importance_scores
        .unwrap_or_default()
        .into_iter()
        .filter(|(label, _)| !label.is_empty())
        .map(|(label, score)| (label, clamp_score(score)))
        .collect();

    let entity_counts: HashMap<String, u64> = raw
        .entity_counts
        .unwrap_or_default()
        .into_iter()
        .filter(|(label, _)| !label.is_empty())
        .collect();

    // The full entity map must cover every key of its derived summaries
    for label in importance_scores.keys().chain(entity_counts.keys()) {
        entities
            .entry(label.clone())
            .or_insert_with(|| UNKNOWN_ENTITY_TYPE.to_string());
    }

    FileEntities {
        entities,
        importance_scores,
        entity_counts,
        network_path: raw.network_path,
        visualizations: none_if_null(raw.visualizations),
        extra: raw.extra,
    }
}

fn normalize_file_network(raw: RawFileNetwork) -> FileNetwork {
    let community_members: HashMap<u32, Vec<CommunityMember>> = raw
        .community_members
        .unwrap_or_default()
        .into_iter()
        .map(|(id, members)| {
            let members: Vec<CommunityMember> = members
                .into_iter()
                .filter(|member| !member.entity.is_empty())
                .collect();
            (id, members)
        })
        .collect();

    let entities: HashMap<String, String> = raw
        .entities
        .unwrap_or_default()
        .into_iter()
        .filter(|(label, _)| !label.is_empty())
        .collect();

    FileNetwork {
        community_members,
        entities,
        network_path: raw.network_path,
        extra: raw.extra,
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn none_if_null(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
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
                    "network_path": "report_network.html",
                    "visualizations": {"analytics_plot": {"data": [], "layout": {}}}
                }
            },
            "scatter_plot": {"data": [], "layout": {}},
            "features_chart": {"data": [], "layout": {}},
            "similarity_heatmap": {"data": [], "layout": {}},
            "clusters": {"report.txt": 0, "notes.txt": 1},
            "network": {
                "report.txt": {
                    "community_members": {
                        "0": [{"entity": "Athens", "type": "GPE"}],
                        "1": [{"entity": "Plato", "type": "PERSON"}]
                    },
                    "entities": {"Athens": "GPE", "Plato": "PERSON"},
                    "network_path": "report_network.html"
                }
            }
        })
    }

    #[test]
    fn test_full_payload_round_trip() {
        let result = normalize(full_payload()).unwrap();

        assert_eq!(result.stats.total_documents, 2);
        assert_eq!(result.stats.avg_degree, 2.5);
        assert_eq!(result.clusters["report.txt"], 0);
        assert_eq!(result.clusters["notes.txt"], 1);

        let record = &result.entities["report.txt"];
        assert_eq!(record.entities["Athens"], "GPE");
        assert_eq!(record.importance_scores["Plato"], 0.7);
        assert_eq!(record.network_path.as_deref(), Some("report_network.html"));
        assert!(record.visualizations.is_some());

        let network = &result.network["report.txt"];
        assert_eq!(network.community_members[&0][0].entity, "Athens");
        assert_eq!(network.community_members[&1][0].kind, "PERSON");
        assert!(!result.is_empty());
    }

    #[test]
    fn test_empty_payload_yields_explicit_empties() {
        let result = normalize(json!({})).unwrap();

        assert_eq!(result.stats, AnalysisStats::default());
        assert!(result.entities.is_empty());
        assert!(result.clusters.is_empty());
        assert!(result.network.is_empty());
        assert!(result.scatter_plot.is_none());
        assert!(result.features_chart.is_none());
        assert!(result.similarity_heatmap.is_none());
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_network_key_is_empty_map() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("network");

        let result = normalize(payload).unwrap();
        assert!(result.network.is_empty());
    }

    #[test]
    fn test_null_fields_are_treated_as_absent() {
        let result = normalize(json!({
            "stats": null,
            "entities": null,
            "scatter_plot": null,
            "network": null
        }))
        .unwrap();

        assert_eq!(result.stats, AnalysisStats::default());
        assert!(result.scatter_plot.is_none());
        assert!(result.network.is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let payload = full_payload();
        let first = normalize(payload.clone()).unwrap();
        let second = normalize(payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_keys_are_backfilled_into_entity_map() {
        let result = normalize(json!({
            "entities": {
                "doc.txt": {
                    "entities": {"Athens": "GPE"},
                    "importance_scores": {"Athens": 0.8, "Sparta": 0.5},
                    "entity_counts": {"GPE": 2}
                }
            }
        }))
        .unwrap();

        let record = &result.entities["doc.txt"];
        for key in record
            .importance_scores
            .keys()
            .chain(record.entity_counts.keys())
        {
            assert!(record.entities.contains_key(key), "missing {key}");
        }
        assert_eq!(record.entities["Athens"], "GPE");
        assert_eq!(record.entities["Sparta"], UNKNOWN_ENTITY_TYPE);
        assert_eq!(record.entities["GPE"], UNKNOWN_ENTITY_TYPE);
    }

    #[test]
    fn test_importance_scores_are_clamped() {
        let result = normalize(json!({
            "entities": {
                "doc.txt": {
                    "importance_scores": {"a": 1.7, "b": -0.2, "c": 0.4}
                }
            }
        }))
        .unwrap();

        let scores = &result.entities["doc.txt"].importance_scores;
        assert_eq!(scores["a"], 1.0);
        assert_eq!(scores["b"], 0.0);
        assert_eq!(scores["c"], 0.4);
    }

    #[test]
    fn test_empty_entity_labels_are_dropped() {
        let result = normalize(json!({
            "entities": {
                "doc.txt": {
                    "entities": {"": "GPE", "Athens": "GPE"},
                    "importance_scores": {"": 0.9}
                }
            },
            "network": {
                "doc.txt": {
                    "community_members": {"0": [{"entity": "", "type": "GPE"}]},
                    "entities": {"": "GPE"}
                }
            }
        }))
        .unwrap();

        let record = &result.entities["doc.txt"];
        assert!(!record.entities.contains_key(""));
        assert!(!record.importance_scores.contains_key(""));
        assert_eq!(record.entities.len(), 1);

        let network = &result.network["doc.txt"];
        assert!(network.community_members[&0].is_empty());
        assert!(network.entities.is_empty());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let result = normalize(json!({
            "stats": {"total_documents": 1, "languages": ["el", "en"]},
            "entities": {
                "doc.txt": {
                    "entities": {"Athens": "GPE"},
                    "sentiment": 0.3
                }
            },
            "model_version": "2024-09"
        }))
        .unwrap();

        assert_eq!(
            result.extra.get("model_version").and_then(Value::as_str),
            Some("2024-09")
        );
        assert!(result.stats.extra.contains_key("languages"));
        assert!(result.entities["doc.txt"].extra.contains_key("sentiment"));

        // Pass-through fields re-serialize at their original level
        let reserialized = serde_json::to_value(&result).unwrap();
        assert_eq!(
            reserialized.get("model_version").and_then(Value::as_str),
            Some("2024-09")
        );
        assert!(reserialized["stats"].get("languages").is_some());
    }

    #[test]
    fn test_negative_community_id_is_rejected() {
        let payload = json!({
            "network": {
                "doc.txt": {
                    "community_members": {"-1": [{"entity": "Athens", "type": "GPE"}]}
                }
            }
        });

        assert!(normalize(payload).is_err());
    }
}
