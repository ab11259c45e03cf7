//! Service-level tests: validation, degradation, caching and configuration,
//! driven through the mock generator and scripted failing generators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use synapse_mind::config::{Provider, ServiceConfig};
use synapse_mind::error::ServiceError;
use synapse_mind::llm::{GenerationOptions, Generator, LlmError, LlmResult};
use synapse_mind::mindmap::{GraphStatus, NodeKind, Strategy};
use synapse_mind::prompts::{Prompt, Task};
use synapse_mind::service::SynapseService;
use synapse_mind::summary::SummaryLevel;

const PASSAGE: &str = "Plate tectonics describes the large-scale motion of Earth's lithosphere. \
    The theory builds on continental drift and seafloor spreading, and explains \
    earthquakes, volcanoes and mountain building.";

fn mock_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.llm.provider = Provider::Mock;
    config.llm.min_interval_secs = 0;
    config
}

/// Counts calls and replays a fixed outcome.
struct Scripted {
    calls: Arc<AtomicUsize>,
    fail: bool,
    reply: &'static str,
}

impl Generator for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn generate(&self, prompt: &Prompt, options: &GenerationOptions) -> LlmResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(*options, GenerationOptions::for_task(prompt.task));
        if self.fail {
            Err(LlmError::Status {
                status: 503,
                message: "unavailable".into(),
            })
        } else {
            Ok(self.reply.to_string())
        }
    }
}

fn scripted(fail: bool, reply: &'static str) -> (SynapseService, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = Scripted {
        calls: Arc::clone(&calls),
        fail,
        reply,
    };
    (SynapseService::with_generator(mock_config(), Box::new(generator)), calls)
}

#[test]
fn mock_service_produces_structured_mind_map() {
    let service = SynapseService::from_config(mock_config());
    let graph = service.mind_map(PASSAGE).unwrap();
    graph.validate().unwrap();
    assert_eq!(graph.status, GraphStatus::Success);
    assert_eq!(graph.root().unwrap().kind, NodeKind::Central);
    assert!(graph.nodes.iter().any(|n| n.kind == NodeKind::Branch));
}

#[test]
fn mock_service_produces_flat_mind_map() {
    let service = SynapseService::from_config(mock_config());
    let graph = service.mind_map_flat(PASSAGE).unwrap();
    graph.validate().unwrap();
    assert_eq!(graph.nodes[0].id, "1");
    assert_eq!(graph.nodes[0].label, "Plate");
    assert_eq!(graph.total_nodes, 5);
}

#[test]
fn mock_summaries_cover_every_level() {
    let service = SynapseService::from_config(mock_config());
    for level in SummaryLevel::ALL {
        let outcome = service.summarize(PASSAGE, level).unwrap();
        assert!(!outcome.degraded);
        assert_eq!(outcome.level, level);
        assert!(!outcome.summary.is_empty());
    }
    assert_eq!(service.usage().requests_today, 3);
}

#[test]
fn validation_happens_before_generation() {
    let (service, calls) = scripted(false, "unused");
    assert!(matches!(
        service.summarize("  short  ", SummaryLevel::Quick),
        Err(ServiceError::TextTooShort { min: 10, actual: 5 })
    ));
    assert!(matches!(
        service.mind_map("just under twenty"),
        Err(ServiceError::TextTooShort { min: 20, .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_level_is_rejected() {
    let err = "verbose".parse::<SummaryLevel>().unwrap_err();
    assert!(matches!(err, ServiceError::InvalidLevel { ref level } if level == "verbose"));
    assert!("Quick".parse::<SummaryLevel>().is_err());
}

#[test]
fn upstream_failure_degrades_every_operation() {
    let (service, calls) = scripted(true, "");

    let summary = service.summarize(PASSAGE, SummaryLevel::Academic).unwrap();
    assert!(summary.degraded);
    assert!(summary.summary.starts_with("Academic analysis"));

    let graph = service.mind_map(PASSAGE).unwrap();
    assert!(graph.is_fallback());
    assert_eq!(
        graph.central_topic,
        "Plate tectonics describes the large-scale motion of Earth's lithosphere"
    );

    let flat = service.mind_map_with(Strategy::Flat, PASSAGE).unwrap();
    assert!(flat.is_fallback());
    assert_eq!(flat.nodes[0].kind, NodeKind::Main);

    assert!(!service.test_connection());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn unstructured_reply_falls_back_to_source() {
    let (service, _) = scripted(false, "I cannot produce a mind map for this text.");
    let graph = service.mind_map(PASSAGE).unwrap();
    assert!(graph.is_fallback());
    graph.validate().unwrap();
}

#[test]
fn whitespace_reply_is_degraded_summary() {
    let (service, _) = scripted(false, "   \n  ");
    let outcome = service.summarize(PASSAGE, SummaryLevel::Quick).unwrap();
    assert!(outcome.degraded);
}

#[test]
fn cached_summaries_skip_generation() {
    let (service, calls) = scripted(false, "Tectonic plates move.");
    let first = service.summarize_cached(PASSAGE, SummaryLevel::Quick).unwrap();
    let second = service.summarize_cached(PASSAGE, SummaryLevel::Quick).unwrap();
    let other_level = service.summarize_cached(PASSAGE, SummaryLevel::Detailed).unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert!(!other_level.cached);
    assert_eq!(second.outcome.summary, "Tectonic plates move.");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let json = serde_json::to_value(&second).unwrap();
    assert_eq!(json["cached"], true);
    assert_eq!(json["level"], "quick");
    assert!(json["cache_time"].is_string());
}

#[test]
fn long_input_is_normalized_before_generation() {
    let mut config = mock_config();
    config.text.max_input_tokens = 10;
    let service = SynapseService::from_config(config);
    let text = "word ".repeat(200);
    let outcome = service.summarize(&text, SummaryLevel::Quick).unwrap();
    assert!(outcome.characters_processed <= 40 + 3);
}

#[test]
fn usage_tracks_requests() {
    let mut config = mock_config();
    config.llm.daily_limit = 10;
    let service = SynapseService::from_config(config);
    service.mind_map(PASSAGE).unwrap();
    let usage = service.usage();
    assert_eq!(usage.requests_today, 1);
    assert_eq!(usage.remaining_today, 9);
    assert_eq!(usage.model, "smart-mock");
}

#[test]
fn config_file_drives_service() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[llm]\nprovider = \"mock\"\nmin_interval_secs = 0\n\n[mindmap]\nstrategy = \"flat\"\n",
    )
    .unwrap();

    let config = ServiceConfig::load(&path).unwrap();
    assert_eq!(config.mindmap.strategy, Strategy::Flat);

    let service = SynapseService::from_config(config);
    assert_eq!(service.generator_name(), "mock");
    let graph = service.mind_map(PASSAGE).unwrap();
    assert_eq!(graph.nodes[0].kind, NodeKind::Main);
}

#[test]
fn prompts_request_expected_formats() {
    assert!(Prompt::new(Task::MindMap, PASSAGE).render().contains("RELATIONSHIPS:"));
    assert!(Prompt::new(Task::Concepts, PASSAGE).render().contains("JSON"));
    assert!(Prompt::new(Task::Summary(SummaryLevel::Quick), PASSAGE)
        .render()
        .contains(PASSAGE));
}
