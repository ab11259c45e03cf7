//! Heuristic cross-branch relationship inference.
//!
//! Relationship statements are free text of the form
//! `"<A> is related to <B> [because ...]"`. Each side is matched against
//! existing node labels by case-insensitive substring search. This gives
//! no connectivity guarantee: statements that name concepts absent from the
//! graph are dropped, and the first matching label wins.

use super::model::Node;

const RELATED_SEPARATOR: &str = " is related to ";
const REASON_SEPARATOR: &str = " because";

/// The two concepts named by one relationship statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation<'a> {
    pub left: &'a str,
    pub right: &'a str,
}

/// Split a statement into its left and right concepts.
///
/// Returns `None` unless the separator occurs exactly once and both sides
/// are non-empty after trimming.
pub fn split_relation(statement: &str) -> Option<Relation<'_>> {
    let mut parts = statement.split(RELATED_SEPARATOR);
    let left = parts.next()?.trim();
    let right_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let right = right_part
        .split(REASON_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim();

    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some(Relation { left, right })
}

/// Strategy for turning a relation into `(source, target)` node id pairs.
///
/// Implementations must only return ids taken from `nodes`.
pub trait RelationMatcher: Send + Sync {
    fn resolve(&self, relation: &Relation<'_>, nodes: &[Node]) -> Vec<(String, String)>;
}

fn label_contains(node: &Node, needle_lower: &str) -> bool {
    node.label.to_lowercase().contains(needle_lower)
}

/// At most one edge per statement.
///
/// Takes the first node whose label contains the left concept, then the
/// first other node containing the right concept. If that first source has
/// no target, the statement yields nothing; later source candidates are not
/// tried.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl RelationMatcher for FirstMatch {
    fn resolve(&self, relation: &Relation<'_>, nodes: &[Node]) -> Vec<(String, String)> {
        let left = relation.left.to_lowercase();
        let right = relation.right.to_lowercase();

        let Some(source) = nodes.iter().find(|n| label_contains(n, &left)) else {
            return Vec::new();
        };
        nodes
            .iter()
            .find(|n| n.id != source.id && label_contains(n, &right))
            .map(|target| vec![(source.id.clone(), target.id.clone())])
            .unwrap_or_default()
    }
}

/// One edge per matching source node, each to its first matching target.
///
/// Pairs already emitted for the statement in either direction are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EveryMatch;

impl RelationMatcher for EveryMatch {
    fn resolve(&self, relation: &Relation<'_>, nodes: &[Node]) -> Vec<(String, String)> {
        let left = relation.left.to_lowercase();
        let right = relation.right.to_lowercase();
        let mut pairs: Vec<(String, String)> = Vec::new();

        for source in nodes.iter().filter(|n| label_contains(n, &left)) {
            let Some(target) = nodes
                .iter()
                .find(|n| n.id != source.id && label_contains(n, &right))
            else {
                continue;
            };
            let seen = pairs.iter().any(|(s, t)| {
                (s == &source.id && t == &target.id) || (s == &target.id && t == &source.id)
            });
            if !seen {
                pairs.push((source.id.clone(), target.id.clone()));
            }
        }
        pairs
    }
}

/// Named matcher selection, as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    #[default]
    FirstMatch,
    EveryMatch,
}

impl MatchStrategy {
    pub fn matcher(self) -> &'static dyn RelationMatcher {
        match self {
            Self::FirstMatch => &FirstMatch,
            Self::EveryMatch => &EveryMatch,
        }
    }
}
