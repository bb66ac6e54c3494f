use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A node in the ecological knowledge graph.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: i64,
    pub name: String,
    /// Category label, e.g. `"Species"`, `"Factor"`, `"Consequence"`.
    pub label: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// A directed, labeled edge between two graph nodes.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: i64,
    pub source: i64,
    pub target: i64,
    pub relation: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// The full node/edge set as served by the knowledge-graph endpoint.
///
/// Together these form a directed labeled multigraph; ids are unique within
/// each set but no further structure is guaranteed.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}
