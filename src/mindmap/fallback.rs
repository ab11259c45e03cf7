//! Minimal graph for when generation or parsing yields nothing usable.
//!
//! Built from the caller's source text alone, so it is available even when
//! the generator is down.

use super::builder::MAX_CENTRAL_LABEL;
use super::concepts::MAX_CONCEPT_LABEL;
use super::model::{truncate_chars, Graph, GraphAccumulator, GraphStatus, NodeKind};

/// Label used when the source text has no first sentence.
pub const DEFAULT_CENTRAL_LABEL: &str = "Main Topic";

/// Keywords scanned for when no list is configured.
pub const DEFAULT_KEYWORDS: [&str; 4] = ["equation", "assumptions", "applications", "variables"];

/// Most keyword branches a fallback graph gets by default.
pub const DEFAULT_MAX_BRANCHES: usize = 3;

/// Fallback construction parameters.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    /// Checked in order, case-insensitively, against the source text.
    pub keywords: Vec<String>,
    pub max_branches: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_branches: DEFAULT_MAX_BRANCHES,
        }
    }
}

/// Build the fallback graph with the default keyword list.
pub fn fallback(source: &str) -> Graph {
    fallback_with(source, &FallbackConfig::default())
}

/// Build a central node from the first sentence of `source`, plus one
/// branch per keyword found in it.
///
/// Always yields exactly one central node, even for empty input.
pub fn fallback_with(source: &str, config: &FallbackConfig) -> Graph {
    let central_label = central_label(source);
    let mut acc = GraphAccumulator::default();
    let central = acc.add_node(central_label.clone(), NodeKind::Central);

    let haystack = source.to_lowercase();
    let found = config
        .keywords
        .iter()
        .filter(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
        .take(config.max_branches);

    for keyword in found {
        let branch = acc.add_node(capitalize(keyword), NodeKind::Branch);
        acc.add_edge(&central, &branch, None, false);
    }

    tracing::warn!(
        central = %central_label,
        branches = acc.nodes().len() - 1,
        "built fallback mind map"
    );
    acc.finish(central_label, GraphStatus::Fallback)
}

/// Words used by [`flat_fallback`] when the source has none long enough.
const FLAT_DEFAULT_WORDS: [&str; 3] = ["Learning", "AI", "Technology"];

/// Fallback for the flat pipeline: a `main` node and two `sub` nodes taken
/// from the first three words longer than four characters.
pub fn flat_fallback(source: &str) -> Graph {
    let words: Vec<&str> = source
        .split_whitespace()
        .filter(|w| w.chars().count() > 4)
        .take(3)
        .collect();
    let words = if words.is_empty() {
        FLAT_DEFAULT_WORDS.to_vec()
    } else {
        words
    };

    let main = truncate_chars(words[0], MAX_CONCEPT_LABEL);
    let second = words.get(1).copied().unwrap_or("Concept 1");
    let third = words.get(2).copied().unwrap_or("Concept 2");

    let mut acc = GraphAccumulator::default();
    acc.add_node_with_id("1".into(), main.clone(), NodeKind::Main);
    acc.add_node_with_id("2".into(), truncate_chars(second, MAX_CONCEPT_LABEL), NodeKind::Sub);
    acc.add_node_with_id("3".into(), truncate_chars(third, MAX_CONCEPT_LABEL), NodeKind::Sub);
    acc.add_edge("1", "2", Some("includes"), false);
    acc.add_edge("1", "3", Some("relates"), false);

    tracing::warn!(central = %main, "built flat fallback mind map");
    acc.finish(main, GraphStatus::Fallback)
}

/// Text before the first `.`, trimmed and capped.
fn central_label(source: &str) -> String {
    let first = source.split('.').next().unwrap_or_default().trim();
    let label = truncate_chars(first, MAX_CENTRAL_LABEL);
    let label = label.trim_end();
    if label.is_empty() {
        DEFAULT_CENTRAL_LABEL.to_string()
    } else {
        label.to_string()
    }
}

/// Uppercase the first character, lowercase the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
