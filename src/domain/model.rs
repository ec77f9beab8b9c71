use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A node in the architecture model. Created during extraction, immutable
/// afterwards; only ever held inside a graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchitectureElement {
    pub id: String,
    pub title: String,
    /// Category tag: actor, system, container, component, external-system,
    /// or "unknown" when the source cannot resolve it.
    pub kind: String,
    /// May embed a network address token of the form "Network ID: <value>".
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
}

/// A directed edge between two elements. The description may embed a
/// protocol/port hint of the form "<text> (<PROTOCOL> <PORT>)".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub description: String,
}

/// Full element mapping plus relationship list as present in the source.
/// Transient; exists only inside the model source adapter and the filter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawGraph {
    pub elements: HashMap<String, ArchitectureElement>,
    pub relationships: Vec<Relationship>,
}

/// Subgraph restricted to elements that participate in at least one
/// relationship. Every element key is referenced by >=1 relationship and
/// every relationship endpoint exists as a key.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilteredGraph {
    pub elements: HashMap<String, ArchitectureElement>,
    pub relationships: Vec<Relationship>,
}

/// What a model source hands to the pipeline: the raw graph plus whether
/// this source strategy populates relationships at all. The live view
/// strategy never does, and the driver must not treat that the same way as
/// a static export that happens to contain zero relations.
#[derive(Debug, Clone)]
pub struct ModelFetch {
    pub graph: RawGraph,
    pub relationships_present: bool,
}

/// Which extraction strategy fed the pipeline. Determines the inference
/// schema and the renderer's placeholder convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    StaticExport,
    LiveView,
}

/// One inferred connectivity rule. Ordering is insertion order as returned
/// by the inference service; never re-sorted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirewallRule {
    pub source: String,
    pub destination: String,
    /// "Any" when no port could be inferred.
    pub port: String,
    pub description: String,
}

/// The rule sequence paired with its two renderings. Both renderings agree
/// element-for-element with the sequence; nothing is dropped, reordered, or
/// deduplicated between them.
#[derive(Debug, Clone)]
pub struct RuleDocument {
    pub rules: Vec<FirewallRule>,
    pub json: String,
    pub table: String,
}
