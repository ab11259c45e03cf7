//! synapse-mind CLI: summaries and mind maps from the command line.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use synapse_mind::config::{Provider, ServiceConfig};
use synapse_mind::error::SynapseError;
use synapse_mind::mindmap::{MindMapPipeline, Strategy};
use synapse_mind::normalize::{estimate_tokens, normalize};
use synapse_mind::service::SynapseService;
use synapse_mind::summary::SummaryLevel;

#[derive(Parser)]
#[command(name = "synapse-mind", version, about = "Text to summary and mind-map generator")]
struct Cli {
    /// Config file (defaults to $SYNAPSE_CONFIG or the XDG config path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the deterministic mock generator instead of the configured provider.
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize text from FILE or stdin.
    Summarize {
        /// quick, detailed or academic.
        #[arg(long, default_value = "quick")]
        level: String,
        file: Option<PathBuf>,
    },

    /// Generate a mind map from FILE or stdin.
    Mindmap {
        /// Flat concept map instead of the hierarchical outline.
        #[arg(long)]
        flat: bool,
        file: Option<PathBuf>,
    },

    /// Turn a raw model response into graph JSON, offline.
    Parse {
        #[arg(long)]
        flat: bool,
        file: Option<PathBuf>,
    },

    /// Collapse whitespace and truncate to a token budget.
    Normalize {
        #[arg(long, default_value = "8000")]
        max_tokens: usize,
        file: Option<PathBuf>,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file.
    Init {
        /// Destination (defaults to the XDG config path).
        path: Option<PathBuf>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML.
    Show,
}

fn read_input(file: Option<&Path>) -> Result<String> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path).map_err(SynapseError::from)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(SynapseError::from)?;
            buf
        }
    };
    Ok(text)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { flat, file } => {
            let response = read_input(file.as_deref())?;
            let strategy = if flat { Strategy::Flat } else { Strategy::Hierarchical };
            let graph = MindMapPipeline::default()
                .with_strategy(strategy)
                .from_response(&response, &response);
            print_json(&graph)?;
        }

        Commands::Normalize { max_tokens, file } => {
            let text = read_input(file.as_deref())?;
            let normalized = normalize(&text, max_tokens);
            tracing::info!(
                before = estimate_tokens(&text),
                after = estimate_tokens(&normalized),
                "estimated tokens"
            );
            println!("{normalized}");
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path, force } => {
                let path = match path.or_else(ServiceConfig::default_path) {
                    Some(p) => p,
                    None => miette::bail!("cannot determine config path; pass one explicitly"),
                };
                if path.exists() && !force {
                    miette::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                ServiceConfig::default().save(&path)?;
                println!("Wrote default config to {}", path.display());
            }
            ConfigAction::Show => {
                let mut config = ServiceConfig::resolve(cli.config.as_deref())?;
                if config.llm.api_key.is_some() {
                    config.llm.api_key = Some("<redacted>".into());
                }
                print!("{}", toml::to_string_pretty(&config).into_diagnostic()?);
            }
        },

        Commands::Summarize { level, file } => {
            let level: SummaryLevel = level.parse()?;
            let service = build_service(cli.config.as_deref(), cli.mock)?;
            let text = read_input(file.as_deref())?;
            let outcome = service.summarize(&text, level)?;
            print_json(&outcome)?;
        }

        Commands::Mindmap { flat, file } => {
            let service = build_service(cli.config.as_deref(), cli.mock)?;
            let text = read_input(file.as_deref())?;
            let graph = if flat {
                service.mind_map_flat(&text)?
            } else {
                service.mind_map(&text)?
            };
            print_json(&graph)?;
        }
    }

    Ok(())
}

fn build_service(config_path: Option<&Path>, mock: bool) -> Result<SynapseService> {
    let mut config = ServiceConfig::resolve(config_path)?;
    if mock {
        config.llm.provider = Provider::Mock;
    }
    Ok(SynapseService::from_config(config))
}
