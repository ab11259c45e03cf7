//! The text-generation collaborator.
//!
//! All language understanding is delegated to a [`Generator`]. The rest of
//! the crate treats it as a black box that may fail, time out, or return
//! text in any shape; callers resolve failures to fallback output.

pub mod gemini;
pub mod mock;

use miette::Diagnostic;
use thiserror::Error;

use crate::prompts::{Prompt, Task};

pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::MockGenerator;

/// Errors from the generation subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("no API key configured for {provider}")]
    #[diagnostic(
        code(synapse::llm::missing_api_key),
        help("Set GEMINI_API_KEY or `llm.api_key` in the config file, or run with --mock.")
    )]
    MissingApiKey { provider: String },

    #[error("generation request failed: {message}")]
    #[diagnostic(
        code(synapse::llm::request_failed),
        help("Check network connectivity and that the configured base URL is reachable.")
    )]
    RequestFailed { message: String },

    #[error("generator returned HTTP {status}: {message}")]
    #[diagnostic(
        code(synapse::llm::status),
        help("A 4xx status usually means a bad key or model name; 429 means the quota is exhausted.")
    )]
    Status { status: u16, message: String },

    #[error("generation timed out after {timeout_secs}s")]
    #[diagnostic(
        code(synapse::llm::timeout),
        help("Increase `llm.timeout_secs` or submit a shorter passage.")
    )]
    Timeout { timeout_secs: u64 },

    #[error("failed to parse generator response: {message}")]
    #[diagnostic(
        code(synapse::llm::parse_error),
        help("The model returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("generator returned no text")]
    #[diagnostic(
        code(synapse::llm::empty_response),
        help("The response may have been blocked by safety filters or truncated to nothing.")
    )]
    EmptyResponse,
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Sampling parameters for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: Option<u32>,
}

impl GenerationOptions {
    /// Preset parameters for a task.
    pub fn for_task(task: Task) -> Self {
        match task {
            Task::Summary(level) => Self {
                max_output_tokens: level.max_output_tokens(),
                temperature: 0.3,
                top_p: 0.8,
                top_k: None,
            },
            Task::MindMap => Self {
                max_output_tokens: 2000,
                temperature: 0.3,
                top_p: 0.9,
                top_k: Some(40),
            },
            Task::Concepts => Self {
                max_output_tokens: 300,
                temperature: 0.3,
                top_p: 0.9,
                top_k: None,
            },
            Task::Probe => Self {
                max_output_tokens: 10,
                temperature: 0.0,
                top_p: 1.0,
                top_k: None,
            },
        }
    }
}

/// A text-generation backend.
pub trait Generator: Send + Sync {
    /// Provider name for logs and usage reports.
    fn name(&self) -> &str;

    /// Model identifier.
    fn model(&self) -> &str;

    /// Whether the backend has what it needs to attempt a request. Does not
    /// touch the network.
    fn is_configured(&self) -> bool;

    fn generate(&self, prompt: &Prompt, options: &GenerationOptions) -> LlmResult<String>;
}
