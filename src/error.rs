//! Rich diagnostic error types for synapse-mind.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives. The mind-map core has none: it is total over its input and
//! never fails.

use miette::Diagnostic;
use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::llm::LlmError;

/// Top-level error type, wrapping each subsystem error with its full
/// diagnostic chain.
#[derive(Debug, Error, Diagnostic)]
pub enum SynapseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {source}")]
    #[diagnostic(
        code(synapse::io),
        help("Reading input or writing output failed. Check the file path and permissions.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for SynapseError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}

// ---------------------------------------------------------------------------
// Service errors
// ---------------------------------------------------------------------------

/// Invalid requests, rejected before any generation happens.
///
/// Upstream failures are deliberately absent: they resolve to fallback
/// output instead of surfacing as errors.
#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("text too short: {actual} characters, at least {min} required")]
    #[diagnostic(
        code(synapse::service::text_too_short),
        help("Select a longer passage. Leading and trailing whitespace does not count.")
    )]
    TextTooShort { min: usize, actual: usize },

    #[error("invalid summary level \"{level}\"")]
    #[diagnostic(
        code(synapse::service::invalid_level),
        help("Use one of: quick, detailed, academic.")
    )]
    InvalidLevel { level: String },
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

pub type SynapseResult<T> = std::result::Result<T, SynapseError>;
