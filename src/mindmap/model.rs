//! Graph types produced by the mind-map builders.
//!
//! The serialized shape is what the browser extension renders: nodes carry
//! a `type` tag and an optional rendering `size`, edges carry an optional
//! label and a `dashed` hint for inferred relationships.

use serde::{Deserialize, Serialize};

/// Closed set of node roles across both pipelines.
///
/// `Central`/`Branch`/`Detail` come from the hierarchical pipeline,
/// `Main`/`Sub` from the flat concept-list pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Central,
    Branch,
    Detail,
    Main,
    Sub,
}

impl NodeKind {
    /// Advisory rendering weight. Only the hierarchical kinds have one.
    pub fn size(self) -> Option<u32> {
        match self {
            Self::Central => Some(30),
            Self::Branch => Some(24),
            Self::Detail => Some(18),
            Self::Main | Self::Sub => None,
        }
    }

    /// Whether this kind is the single root of a graph.
    pub fn is_root(self) -> bool {
        matches!(self, Self::Central | Self::Main)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Central => "central",
            Self::Branch => "branch",
            Self::Detail => "detail",
            Self::Main => "main",
            Self::Sub => "sub",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in a mind-map graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within one graph.
    pub id: String,
    /// Display text.
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl Node {
    /// Create a node whose size follows its kind.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            size: kind.size(),
        }
    }
}

/// A directed, optionally labeled edge between two nodes of the same graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Set only on inferred relationship edges.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dashed: bool,
}

/// Whether a graph came from a structured parse or from the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStatus {
    Success,
    Fallback,
}

/// The top-level mind-map artifact returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub central_topic: String,
    pub status: GraphStatus,
}

impl Graph {
    /// The root (`central` or `main`) node, if any.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind.is_root())
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up the first node with exactly this label.
    pub fn node_by_label(&self, label: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.label == label)
    }

    /// Edges leaving the given node, in creation order.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    pub fn is_fallback(&self) -> bool {
        self.status == GraphStatus::Fallback
    }

    /// Check the structural contract: exactly one root node, unique ids,
    /// no dangling edge endpoints, and consistent totals.
    pub fn validate(&self) -> Result<(), String> {
        let roots = self.nodes.iter().filter(|n| n.kind.is_root()).count();
        if roots != 1 {
            return Err(format!("expected exactly one root node, found {roots}"));
        }

        let mut node_ids = std::collections::HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(format!("duplicate node id \"{}\"", node.id));
            }
        }

        let mut edge_ids = std::collections::HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(format!("duplicate edge id \"{}\"", edge.id));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(format!(
                        "edge \"{}\" references unknown node \"{endpoint}\"",
                        edge.id
                    ));
                }
            }
        }

        if self.total_nodes != self.nodes.len() || self.total_edges != self.edges.len() {
            return Err("totals do not match node/edge counts".into());
        }
        Ok(())
    }
}

/// Sequential id allocation for one graph construction.
///
/// Node and edge counters are independent and both start at zero. The
/// allocator is owned by a single builder call and dropped with it, so ids
/// are stable within one generation only.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_node: usize,
    next_edge: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next `node_<n>` id.
    pub fn node(&mut self) -> String {
        let id = format!("node_{}", self.next_node);
        self.next_node += 1;
        id
    }

    /// Next `edge_<n>` id.
    pub fn edge(&mut self) -> String {
        let id = format!("edge_{}", self.next_edge);
        self.next_edge += 1;
        id
    }
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Accumulates nodes and edges, then seals them into a [`Graph`].
///
/// Edges can only be added between ids this accumulator has already handed
/// out, which keeps every `source`/`target` valid by construction.
#[derive(Debug, Default)]
pub(crate) struct GraphAccumulator {
    ids: IdAllocator,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphAccumulator {
    pub(crate) fn add_node(&mut self, label: impl Into<String>, kind: NodeKind) -> String {
        let id = self.ids.node();
        self.nodes.push(Node::new(id.clone(), label, kind));
        id
    }

    /// Add a node with a caller-chosen id (the flat pipeline numbers from 1).
    pub(crate) fn add_node_with_id(&mut self, id: String, label: impl Into<String>, kind: NodeKind) {
        self.nodes.push(Node::new(id, label, kind));
    }

    pub(crate) fn add_edge(&mut self, source: &str, target: &str, label: Option<&str>, dashed: bool) {
        debug_assert!(self.nodes.iter().any(|n| n.id == source));
        debug_assert!(self.nodes.iter().any(|n| n.id == target));
        let id = self.ids.edge();
        self.edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            label: label.map(str::to_string),
            dashed,
        });
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn finish(self, central_topic: String, status: GraphStatus) -> Graph {
        Graph {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            nodes: self.nodes,
            edges: self.edges,
            central_topic,
            status,
        }
    }
}
