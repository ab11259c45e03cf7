// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # synapse-mind
//!
//! Turns a passage of text into a summary or a mind-map graph, delegating
//! language understanding to a generative model and degrading to
//! deterministic output whenever the model is unavailable.
//!
//! ## Architecture
//!
//! - **Normalizer** (`normalize`): whitespace collapse and boundary-aware truncation
//! - **Mind map** (`mindmap`): response line-parser, graph builder, fallback and
//!   flat concept-list variant, all total over their input
//! - **Generators** (`llm`): the `Generator` seam with Gemini and mock backends
//! - **Service** (`service`): validation, rate limiting, caching and degradation
//!
//! ## Library usage
//!
//! ```
//! use synapse_mind::mindmap::{build_mind_map, GraphStatus};
//!
//! let response = "CENTRAL_TOPIC: Photosynthesis\nBRANCHES:\n1. Light Reactions\n• Occur in thylakoids";
//! let graph = build_mind_map(response);
//! assert_eq!(graph.status, GraphStatus::Success);
//! assert_eq!(graph.total_nodes, 3);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod mindmap;
pub mod normalize;
pub mod prompts;
pub mod rate_limit;
pub mod service;
pub mod summary;
