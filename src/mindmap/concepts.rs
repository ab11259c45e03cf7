//! Flat concept-list pipeline.
//!
//! The concept prompt asks for a short JSON array of key concepts. The
//! response is parsed as JSON when it contains a bracketed array, otherwise
//! line by line, and the result becomes a one-level star graph.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{truncate_chars, Graph, GraphAccumulator, GraphStatus, NodeKind};

/// Most concepts kept from one response.
pub const MAX_CONCEPTS: usize = 5;

/// Longest concept label kept.
pub const MAX_CONCEPT_LABEL: usize = 30;

/// Lines at or above this many characters are prose, not concepts.
const MAX_LINE_CONCEPT: usize = 50;

/// Used when neither strategy finds anything.
pub const DEFAULT_CONCEPTS: [&str; 3] = ["Main Concept", "Key Point 1", "Key Point 2"];

const FENCES: [&str; 3] = ["```json", "```python", "```"];

static ENUMERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\-•.\s]+").expect("valid enumerator regex"));

/// Concepts extracted from a response, and how they were obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptList {
    pub concepts: Vec<String>,
    pub source: ConceptSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptSource {
    Json,
    Lines,
    Default,
}

/// Extract up to [`MAX_CONCEPTS`] concepts from a raw response.
pub fn parse_concepts(response: &str) -> ConceptList {
    let text = FENCES
        .iter()
        .fold(response.to_string(), |acc, fence| acc.replace(fence, ""));

    if let Some(concepts) = json_concepts(&text).filter(|c| !c.is_empty()) {
        return ConceptList {
            concepts,
            source: ConceptSource::Json,
        };
    }

    let concepts = line_concepts(&text);
    if !concepts.is_empty() {
        return ConceptList {
            concepts,
            source: ConceptSource::Lines,
        };
    }

    tracing::debug!("no concepts found, using defaults");
    ConceptList {
        concepts: DEFAULT_CONCEPTS.iter().map(|c| c.to_string()).collect(),
        source: ConceptSource::Default,
    }
}

/// Parse the span from the first `[` through the first `]` as a JSON string
/// array. `None` on any failure.
fn json_concepts(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.find(']')?;
    if end < start {
        return None;
    }
    let values: Vec<String> = serde_json::from_str(&text[start..=end]).ok()?;
    Some(
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .take(MAX_CONCEPTS)
            .collect(),
    )
}

/// Non-blank lines with any leading enumerator or bullet removed.
fn line_concepts(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ENUMERATOR.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty() && line.chars().count() < MAX_LINE_CONCEPT)
        .take(MAX_CONCEPTS)
        .collect()
}

/// Build the star graph: the first concept is the `main` node with id
/// `"1"`, every other concept a `sub` node numbered by position.
///
/// Empty input is replaced by [`DEFAULT_CONCEPTS`].
pub fn build_flat(concepts: &[String]) -> Graph {
    let defaults: Vec<String>;
    let concepts = if concepts.is_empty() {
        defaults = DEFAULT_CONCEPTS.iter().map(|c| c.to_string()).collect();
        &defaults[..]
    } else {
        concepts
    };

    let mut acc = GraphAccumulator::default();
    let main_label = truncate_chars(&concepts[0], MAX_CONCEPT_LABEL);
    acc.add_node_with_id("1".into(), main_label.clone(), NodeKind::Main);

    for (i, concept) in concepts.iter().enumerate().skip(1) {
        let id = (i + 1).to_string();
        acc.add_node_with_id(id.clone(), truncate_chars(concept, MAX_CONCEPT_LABEL), NodeKind::Sub);
        acc.add_edge("1", &id, Some("includes"), false);
    }

    acc.finish(main_label, GraphStatus::Success)
}

/// Parse and build in one step. Default concepts mark the graph as a
/// fallback.
pub fn build_from_response(response: &str) -> Graph {
    let list = parse_concepts(response);
    let mut graph = build_flat(&list.concepts);
    if list.source == ConceptSource::Default {
        graph.status = GraphStatus::Fallback;
    }
    graph
}
