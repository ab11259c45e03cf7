//! synapse-mind HTTP server.
//!
//! - `GET  /` endpoint index
//! - `GET  /health` liveness and generator status
//! - `GET  /api/usage` request counters
//! - `POST /api/summary` summary at a given level
//! - `POST /api/summary/cached` summary served from the response cache when fresh
//! - `POST /api/mindmap` hierarchical (or configured) mind map
//! - `POST /api/mindmap/flat` flat concept mind map
//! - `POST /api/test` end-to-end quick summary of a sample sentence
//!
//! Build and run: `cargo run --features server --bin synapse-server`

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use synapse_mind::config::ServiceConfig;
use synapse_mind::error::ServiceError;
use synapse_mind::mindmap::Graph;
use synapse_mind::rate_limit::UsageStats;
use synapse_mind::service::{CachedSummary, SummaryOutcome, SynapseService};
use synapse_mind::summary::SummaryLevel;

const SAMPLE_TEXT: &str = "AI is transforming education through personalized learning.";

type ApiError = (StatusCode, String);

// ── Request / response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct SummaryRequest {
    text: String,
    #[serde(default = "default_level")]
    level: String,
}

fn default_level() -> String {
    "quick".into()
}

#[derive(Deserialize)]
struct MindMapRequest {
    text: String,
}

#[derive(Deserialize)]
struct TestParams {
    text: Option<String>,
}

#[derive(Serialize)]
struct IndexResponse {
    message: &'static str,
    version: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    service: &'static str,
    provider: String,
    generator_ready: bool,
}

#[derive(Serialize)]
struct UsageResponse {
    status: &'static str,
    stats: UsageStats,
    message: String,
}

#[derive(Serialize)]
struct SummaryResponse {
    status: &'static str,
    #[serde(flatten)]
    outcome: SummaryOutcome,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct CachedSummaryResponse {
    status: &'static str,
    #[serde(flatten)]
    summary: CachedSummary,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct MindMapResponse {
    #[serde(flatten)]
    graph: Graph,
    total_concepts: usize,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct TestResponse {
    test: &'static str,
    summary: String,
    degraded: bool,
    connected: bool,
    model: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn bad_request(e: ServiceError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Run a blocking service call off the async runtime.
async fn blocking<T, F>(service: &Arc<SynapseService>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SynapseService) -> Result<T, ServiceError> + Send + 'static,
{
    let service = Arc::clone(service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("worker failed: {e}")))?
        .map_err(bad_request)
}

fn mind_map_response(graph: Graph) -> Json<MindMapResponse> {
    Json(MindMapResponse {
        total_concepts: graph.total_nodes,
        graph,
        timestamp: Utc::now(),
    })
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "synapse-mind API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: BTreeMap::from([
            ("health", "/health"),
            ("usage", "/api/usage"),
            ("summary", "/api/summary (POST)"),
            ("summary_cached", "/api/summary/cached (POST)"),
            ("mindmap", "/api/mindmap (POST)"),
            ("mindmap_flat", "/api/mindmap/flat (POST)"),
            ("test", "/api/test (POST)"),
        ]),
    })
}

async fn health(State(service): State<Arc<SynapseService>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "synapse-mind",
        provider: service.generator_name().to_string(),
        generator_ready: service.is_configured(),
    })
}

async fn usage(State(service): State<Arc<SynapseService>>) -> Json<UsageResponse> {
    let stats = service.usage();
    Json(UsageResponse {
        status: "success",
        message: format!("{} requests left today", stats.remaining_today),
        stats,
    })
}

async fn summary(
    State(service): State<Arc<SynapseService>>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let level: SummaryLevel = request.level.parse().map_err(bad_request)?;
    tracing::info!(%level, chars = request.text.chars().count(), "summary requested");
    let outcome = blocking(&service, move |s| s.summarize(&request.text, level)).await?;
    Ok(Json(SummaryResponse {
        status: "success",
        outcome,
        timestamp: Utc::now(),
    }))
}

async fn summary_cached(
    State(service): State<Arc<SynapseService>>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<CachedSummaryResponse>, ApiError> {
    let level: SummaryLevel = request.level.parse().map_err(bad_request)?;
    let summary = blocking(&service, move |s| s.summarize_cached(&request.text, level)).await?;
    Ok(Json(CachedSummaryResponse {
        status: "success",
        summary,
        timestamp: Utc::now(),
    }))
}

async fn mindmap(
    State(service): State<Arc<SynapseService>>,
    Json(request): Json<MindMapRequest>,
) -> Result<Json<MindMapResponse>, ApiError> {
    tracing::info!(chars = request.text.chars().count(), "mind map requested");
    let graph = blocking(&service, move |s| s.mind_map(&request.text)).await?;
    Ok(mind_map_response(graph))
}

async fn mindmap_flat(
    State(service): State<Arc<SynapseService>>,
    Json(request): Json<MindMapRequest>,
) -> Result<Json<MindMapResponse>, ApiError> {
    let graph = blocking(&service, move |s| s.mind_map_flat(&request.text)).await?;
    Ok(mind_map_response(graph))
}

async fn test(
    State(service): State<Arc<SynapseService>>,
    Query(params): Query<TestParams>,
) -> Result<Json<TestResponse>, ApiError> {
    let text = params.text.unwrap_or_else(|| SAMPLE_TEXT.to_string());
    let connected = service.is_configured();
    let outcome = blocking(&service, move |s| s.summarize(&text, SummaryLevel::Quick)).await?;
    Ok(Json(TestResponse {
        test: if outcome.degraded { "failed" } else { "passed" },
        summary: outcome.summary,
        degraded: outcome.degraded,
        connected,
        model: service.model().to_string(),
    }))
}

// ── Main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config = ServiceConfig::resolve(explicit.as_deref()).unwrap_or_else(|e| {
        tracing::error!("failed to load configuration: {e}");
        std::process::exit(1);
    });
    let addr = config.listen_addr();

    let service = Arc::new(SynapseService::from_config(config));

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/usage", get(usage))
        // Summaries.
        .route("/api/summary", post(summary))
        .route("/api/summary/cached", post(summary_cached))
        // Mind maps.
        .route("/api/mindmap", post(mindmap))
        .route("/api/mindmap/flat", post(mindmap_flat))
        .route("/api/test", post(test))
        .layer(CorsLayer::permissive())
        .with_state(service);

    tracing::info!("synapse-mind server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
