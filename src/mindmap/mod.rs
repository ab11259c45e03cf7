//! Mind-map construction from generator responses.
//!
//! Two alternative pipelines turn raw response text into a [`Graph`]:
//!
//! - **Hierarchical** (`parser` + `builder`): a CENTRAL_TOPIC / BRANCHES /
//!   RELATIONSHIPS outline becomes central, branch and detail nodes with
//!   heuristic "related to" edges.
//! - **Flat** (`concepts`): a short concept list becomes a one-level star.
//!
//! Both are total: every input, including empty and adversarial text,
//! yields a graph with exactly one root node and no dangling edges. When a
//! response carries no usable structure the `fallback` builders take over.

pub mod builder;
pub mod concepts;
pub mod fallback;
pub mod model;
pub mod parser;
pub mod relate;

use serde::{Deserialize, Serialize};

pub use builder::{build, GraphBuilder};
pub use concepts::{build_flat, parse_concepts, ConceptList, ConceptSource};
pub use fallback::{fallback, fallback_with, flat_fallback, FallbackConfig};
pub use model::{Edge, Graph, GraphStatus, IdAllocator, Node, NodeKind};
pub use parser::{parse_structured, Branch, Outline};
pub use relate::{EveryMatch, FirstMatch, MatchStrategy, RelationMatcher};

/// Which pipeline interprets a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Hierarchical,
    Flat,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hierarchical" => Ok(Self::Hierarchical),
            "flat" => Ok(Self::Flat),
            other => Err(format!("unknown mind-map strategy \"{other}\"")),
        }
    }
}

/// Hierarchical pipeline on a raw response.
///
/// The response doubles as the fallback source text, since no other text
/// is available here.
pub fn build_mind_map(response: &str) -> Graph {
    MindMapPipeline::default().from_response(response, response)
}

/// Flat pipeline on a raw response.
pub fn build_mind_map_flat(response: &str) -> Graph {
    MindMapPipeline::flat().from_response(response, response)
}

/// A configured pipeline that knows the submitted source text, so failures
/// fall back to a graph built from what the user actually submitted.
#[derive(Debug, Clone, Default)]
pub struct MindMapPipeline {
    pub strategy: Strategy,
    pub relations: MatchStrategy,
    pub fallback: FallbackConfig,
}

impl MindMapPipeline {
    pub fn flat() -> Self {
        Self {
            strategy: Strategy::Flat,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Interpret a response, falling back on `source` when it holds nothing
    /// usable.
    ///
    /// The flat pipeline never consults `source` here: a response without
    /// concepts yields the default concept list.
    pub fn from_response(&self, response: &str, source: &str) -> Graph {
        match self.strategy {
            Strategy::Hierarchical => {
                let outline = parse_structured(response);
                if outline.is_usable() {
                    GraphBuilder::with_matcher(self.relations.matcher()).build(&outline)
                } else {
                    tracing::warn!(
                        branches = outline.branches.len(),
                        "response has no central topic"
                    );
                    self.fallback_graph(source)
                }
            }
            Strategy::Flat => concepts::build_from_response(response),
        }
    }

    /// Resolve a generator outcome. Any error becomes the fallback graph.
    pub fn from_outcome<E: std::fmt::Display>(
        &self,
        outcome: Result<String, E>,
        source: &str,
    ) -> Graph {
        match outcome {
            Ok(response) => self.from_response(&response, source),
            Err(e) => {
                tracing::error!(error = %e, "generation failed, using fallback mind map");
                self.fallback_graph(source)
            }
        }
    }

    /// The fallback graph matching this pipeline's node vocabulary.
    pub fn fallback_graph(&self, source: &str) -> Graph {
        match self.strategy {
            Strategy::Hierarchical => fallback_with(source, &self.fallback),
            Strategy::Flat => flat_fallback(source),
        }
    }
}
