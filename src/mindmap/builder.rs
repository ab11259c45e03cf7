//! Outline-to-graph construction for the hierarchical pipeline.

use super::model::{truncate_chars, Graph, GraphAccumulator, GraphStatus, NodeKind};
use super::parser::Outline;
use super::relate::{split_relation, FirstMatch, RelationMatcher};

/// Longest central-topic label kept; longer topics are truncated.
pub const MAX_CENTRAL_LABEL: usize = 100;

const CONTAINS: &str = "contains";
const INCLUDES: &str = "includes";
const RELATED_TO: &str = "related to";

/// Builds graphs from outlines using a pluggable relationship matcher.
pub struct GraphBuilder<'m> {
    matcher: &'m dyn RelationMatcher,
}

impl Default for GraphBuilder<'static> {
    fn default() -> Self {
        Self { matcher: &FirstMatch }
    }
}

impl<'m> GraphBuilder<'m> {
    pub fn with_matcher(matcher: &'m dyn RelationMatcher) -> Self {
        Self { matcher }
    }

    /// Convert an outline into a graph.
    ///
    /// Node order is the central node, then each branch followed by its
    /// details, then nothing else: inferred relationship edges are appended
    /// after all nodes exist. Branch edges are only emitted when there is a
    /// central node to hang them from.
    pub fn build(&self, outline: &Outline) -> Graph {
        let mut acc = GraphAccumulator::default();
        let central_topic = truncate_chars(&outline.central_topic, MAX_CENTRAL_LABEL);

        let central = (!central_topic.is_empty())
            .then(|| acc.add_node(central_topic.clone(), NodeKind::Central));

        for branch in &outline.branches {
            let branch_id = acc.add_node(branch.name.clone(), NodeKind::Branch);
            if let Some(central_id) = &central {
                acc.add_edge(central_id, &branch_id, Some(CONTAINS), false);
            }
            for point in &branch.points {
                let point_id = acc.add_node(point.clone(), NodeKind::Detail);
                acc.add_edge(&branch_id, &point_id, Some(INCLUDES), false);
            }
        }

        let mut inferred = 0usize;
        for statement in &outline.relationships {
            let Some(relation) = split_relation(statement) else {
                continue;
            };
            for (source, target) in self.matcher.resolve(&relation, acc.nodes()) {
                acc.add_edge(&source, &target, Some(RELATED_TO), true);
                inferred += 1;
            }
        }

        tracing::debug!(
            branches = outline.branches.len(),
            inferred,
            "built hierarchical graph"
        );
        acc.finish(central_topic, GraphStatus::Success)
    }
}

/// Build with the default first-match relationship strategy.
pub fn build(outline: &Outline) -> Graph {
    GraphBuilder::default().build(outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mindmap::parser::Branch;
    use crate::mindmap::relate::EveryMatch;

    fn outline() -> Outline {
        Outline {
            central_topic: "Energy".into(),
            branches: vec![
                Branch {
                    name: "Renewable".into(),
                    points: vec!["Solar".into(), "Wind".into()],
                },
                Branch {
                    name: "Fossil".into(),
                    points: vec!["Coal".into()],
                },
            ],
            relationships: vec!["Solar is related to Coal because both make power".into()],
        }
    }

    #[test]
    fn ids_follow_creation_order() {
        let graph = build(&outline());
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["node_0", "node_1", "node_2", "node_3", "node_4", "node_5"]);
        let labels: Vec<_> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, ["Energy", "Renewable", "Solar", "Wind", "Fossil", "Coal"]);
        assert_eq!(graph.edges[0].id, "edge_0");
        assert_eq!(graph.edges.last().unwrap().id, format!("edge_{}", graph.edges.len() - 1));
    }

    #[test]
    fn edge_labels_by_level() {
        let graph = build(&outline());
        let central = &graph.nodes[0];
        let contains: Vec<_> = graph.edges_from(&central.id).collect();
        assert_eq!(contains.len(), 2);
        assert!(contains.iter().all(|e| e.label.as_deref() == Some("contains")));

        let from_renewable: Vec<_> = graph.edges_from("node_1").collect();
        assert_eq!(from_renewable.len(), 2);
        assert!(from_renewable.iter().all(|e| e.label.as_deref() == Some("includes") && !e.dashed));
    }

    #[test]
    fn relationship_edge_is_dashed() {
        let graph = build(&outline());
        let related: Vec<_> = graph.edges.iter().filter(|e| e.dashed).collect();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].source, "node_2");
        assert_eq!(related[0].target, "node_5");
        assert_eq!(related[0].label.as_deref(), Some("related to"));
        graph.validate().unwrap();
    }

    #[test]
    fn unmatched_relationship_is_skipped() {
        let mut o = outline();
        o.relationships = vec!["Nuclear is related to Solar".into()];
        let graph = build(&o);
        assert!(graph.edges.iter().all(|e| !e.dashed));
    }

    #[test]
    fn no_central_means_no_contains_edges() {
        let mut o = outline();
        o.central_topic.clear();
        o.relationships.clear();
        let graph = build(&o);
        assert!(graph.root().is_none());
        assert_eq!(graph.nodes[0].id, "node_0");
        assert!(graph.edges.iter().all(|e| e.label.as_deref() == Some("includes")));
    }

    #[test]
    fn long_central_topic_truncated() {
        let mut o = outline();
        o.central_topic = "x".repeat(250);
        let graph = build(&o);
        assert_eq!(graph.central_topic.chars().count(), MAX_CENTRAL_LABEL);
        assert_eq!(graph.nodes[0].label, graph.central_topic);
    }

    #[test]
    fn matcher_is_pluggable() {
        let mut o = outline();
        o.branches[1].points.push("Solar-adjacent coal".into());
        o.relationships = vec!["Solar is related to Coal".into()];

        let first = build(&o);
        let every = GraphBuilder::with_matcher(&EveryMatch).build(&o);
        let dashed = |g: &Graph| g.edges.iter().filter(|e| e.dashed).count();
        assert_eq!(dashed(&first), 1);
        assert_eq!(dashed(&every), 2);
    }
}
