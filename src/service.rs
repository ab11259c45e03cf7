//! The service facade: validation, normalization, rate limiting, generation
//! and graceful degradation, in that order.
//!
//! Invalid requests are errors. Everything that goes wrong upstream is not:
//! it resolves to a fallback summary or fallback graph built from the text
//! the caller submitted.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::ResponseCache;
use crate::config::{Provider, ServiceConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::llm::{GeminiClient, GenerationOptions, Generator, LlmResult, MockGenerator};
use crate::mindmap::{Graph, MindMapPipeline, Strategy};
use crate::normalize::normalize;
use crate::prompts::{Prompt, Task};
use crate::rate_limit::{RateLimiter, UsageStats};
use crate::summary::{fallback_summary, SummaryLevel};

/// Result of a summary request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOutcome {
    pub summary: String,
    pub level: SummaryLevel,
    /// True when generation failed and a fallback summary was produced.
    pub degraded: bool,
    /// Characters of normalized input sent to the generator.
    pub characters_processed: usize,
}

/// A summary with cache provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedSummary {
    #[serde(flatten)]
    pub outcome: SummaryOutcome,
    pub cached: bool,
    pub cache_time: DateTime<Utc>,
}

pub struct SynapseService {
    generator: Box<dyn Generator>,
    limiter: RateLimiter,
    cache: ResponseCache<SummaryOutcome>,
    pipeline: MindMapPipeline,
    config: ServiceConfig,
}

impl SynapseService {
    /// Build the service with the generator named by `config.llm.provider`.
    ///
    /// The mock generator is not rate limited.
    pub fn from_config(config: ServiceConfig) -> Self {
        match config.llm.provider {
            Provider::Gemini => {
                let client = GeminiClient::new(config.gemini());
                if !client.is_configured() {
                    tracing::warn!("no Gemini API key configured; every request will fall back");
                }
                let limiter = RateLimiter::new(config.min_interval(), config.llm.daily_limit);
                Self::assemble(config, Box::new(client), limiter)
            }
            Provider::Mock => {
                let limiter = RateLimiter::new(Duration::ZERO, config.llm.daily_limit);
                Self::assemble(config, Box::new(MockGenerator::new()), limiter)
            }
        }
    }

    /// Build the service around an arbitrary generator.
    pub fn with_generator(config: ServiceConfig, generator: Box<dyn Generator>) -> Self {
        let limiter = RateLimiter::new(config.min_interval(), config.llm.daily_limit);
        Self::assemble(config, generator, limiter)
    }

    fn assemble(config: ServiceConfig, generator: Box<dyn Generator>, limiter: RateLimiter) -> Self {
        tracing::info!(
            provider = generator.name(),
            model = generator.model(),
            min_interval_secs = config.llm.min_interval_secs,
            "service ready"
        );
        Self {
            generator,
            limiter,
            cache: ResponseCache::new(config.cache_ttl(), config.cache.key_prefix_chars),
            pipeline: config.pipeline(),
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// Trim and check length; returns the normalized text.
    fn prepare(&self, text: &str, min: usize) -> ServiceResult<String> {
        let trimmed = text.trim();
        let actual = trimmed.chars().count();
        if actual < min {
            return Err(ServiceError::TextTooShort { min, actual });
        }
        Ok(normalize(trimmed, self.config.text.max_input_tokens))
    }

    fn generate(&self, task: Task, text: &str) -> LlmResult<String> {
        let waited = self.limiter.acquire();
        if !waited.is_zero() {
            tracing::debug!(task = task.name(), waited_ms = waited.as_millis() as u64, "rate limited");
        }
        self.generator
            .generate(&Prompt::new(task, text), &GenerationOptions::for_task(task))
    }

    pub fn summarize(&self, text: &str, level: SummaryLevel) -> ServiceResult<SummaryOutcome> {
        let text = self.prepare(text, self.config.text.min_summary_chars)?;
        let characters_processed = text.chars().count();

        let (summary, degraded) = match self.generate(Task::Summary(level), &text) {
            Ok(summary) if !summary.trim().is_empty() => (summary.trim().to_string(), false),
            Ok(_) => {
                tracing::warn!(%level, "generator returned an empty summary, using fallback");
                (fallback_summary(&text, level), true)
            }
            Err(e) => {
                tracing::error!(error = %e, %level, "summary generation failed, using fallback");
                (fallback_summary(&text, level), true)
            }
        };

        Ok(SummaryOutcome {
            summary,
            level,
            degraded,
            characters_processed,
        })
    }

    /// Summarize, serving repeats from the cache. Degraded summaries are
    /// not cached.
    pub fn summarize_cached(&self, text: &str, level: SummaryLevel) -> ServiceResult<CachedSummary> {
        let trimmed = text.trim();
        if let Some(hit) = self.cache.get(trimmed, level) {
            tracing::debug!(%level, "summary cache hit");
            return Ok(CachedSummary {
                outcome: hit.value,
                cached: true,
                cache_time: hit.created_at,
            });
        }

        let outcome = self.summarize(trimmed, level)?;
        let cache_time = if outcome.degraded {
            Utc::now()
        } else {
            self.cache.insert(trimmed, level, outcome.clone())
        };
        Ok(CachedSummary {
            outcome,
            cached: false,
            cache_time,
        })
    }

    /// Mind map using the configured strategy.
    pub fn mind_map(&self, text: &str) -> ServiceResult<Graph> {
        self.mind_map_with(self.pipeline.strategy, text)
    }

    pub fn mind_map_flat(&self, text: &str) -> ServiceResult<Graph> {
        self.mind_map_with(Strategy::Flat, text)
    }

    pub fn mind_map_with(&self, strategy: Strategy, text: &str) -> ServiceResult<Graph> {
        let text = self.prepare(text, self.config.text.min_mindmap_chars)?;
        let pipeline = self.pipeline.clone().with_strategy(strategy);
        let task = match strategy {
            Strategy::Hierarchical => Task::MindMap,
            Strategy::Flat => Task::Concepts,
        };

        let graph = pipeline.from_outcome(self.generate(task, &text), &text);
        tracing::info!(
            strategy = ?strategy,
            nodes = graph.total_nodes,
            edges = graph.total_edges,
            status = ?graph.status,
            "mind map built"
        );
        Ok(graph)
    }

    pub fn usage(&self) -> UsageStats {
        self.limiter.usage(self.generator.model())
    }

    /// Send the probe prompt. False when unconfigured or on any failure.
    pub fn test_connection(&self) -> bool {
        if !self.generator.is_configured() {
            return false;
        }
        match self.generate(Task::Probe, &Prompt::probe().text) {
            Ok(text) => !text.trim().is_empty(),
            Err(e) => {
                tracing::warn!(error = %e, "connection test failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for SynapseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynapseService")
            .field("generator", &self.generator.name())
            .field("model", &self.generator.model())
            .field("requests", &self.limiter.request_count())
            .finish()
    }
}
