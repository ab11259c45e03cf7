//! Service configuration, persisted as TOML.
//!
//! Resolution order: built-in defaults, then the config file (if present),
//! then environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::GeminiConfig;
use crate::mindmap::{FallbackConfig, MatchStrategy, MindMapPipeline, Strategy};
use crate::mindmap::fallback::{DEFAULT_KEYWORDS, DEFAULT_MAX_BRANCHES};

/// Errors from loading or saving configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(synapse::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(synapse::config::parse),
        help("The file must be valid TOML. Run `synapse-mind config init` to write a fresh one.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(synapse::config::write),
        help("Check that the parent directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {message}")]
    #[diagnostic(code(synapse::config::serialize))]
    Serialize { message: String },

    #[error("invalid port \"{value}\"")]
    #[diagnostic(
        code(synapse::config::invalid_port),
        help("Ports must be in the range 1-65535.")
    )]
    InvalidPort { value: String },

    #[error("unknown provider \"{value}\"")]
    #[diagnostic(
        code(synapse::config::invalid_provider),
        help("Use `gemini` or `mock`.")
    )]
    InvalidProvider { value: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Which generator backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Mock,
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(ConfigError::InvalidProvider {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSection {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Minimum spacing between generator calls.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSection {
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,
    /// Minimum trimmed length, in characters.
    #[serde(default = "default_min_summary_chars")]
    pub min_summary_chars: usize,
    #[serde(default = "default_min_mindmap_chars")]
    pub min_mindmap_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Characters of input that make up the cache key.
    #[serde(default = "default_key_prefix_chars")]
    pub key_prefix_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapSection {
    #[serde(default = "default_fallback_keywords")]
    pub fallback_keywords: Vec<String>,
    #[serde(default = "default_max_fallback_branches")]
    pub max_fallback_branches: usize,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub relations: MatchStrategy,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub text: TextSection,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub mindmap: MindMapSection,
}

fn default_bind() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_min_interval_secs() -> u64 {
    60
}
fn default_daily_limit() -> u64 {
    250_000
}
fn default_max_input_tokens() -> usize {
    crate::normalize::DEFAULT_MAX_TOKENS
}
fn default_min_summary_chars() -> usize {
    10
}
fn default_min_mindmap_chars() -> usize {
    20
}
fn default_ttl_secs() -> u64 {
    3600
}
fn default_key_prefix_chars() -> usize {
    100
}
fn default_fallback_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
fn default_max_fallback_branches() -> usize {
    DEFAULT_MAX_BRANCHES
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            min_interval_secs: default_min_interval_secs(),
            daily_limit: default_daily_limit(),
        }
    }
}

impl Default for TextSection {
    fn default() -> Self {
        Self {
            max_input_tokens: default_max_input_tokens(),
            min_summary_chars: default_min_summary_chars(),
            min_mindmap_chars: default_min_mindmap_chars(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            key_prefix_chars: default_key_prefix_chars(),
        }
    }
}

impl Default for MindMapSection {
    fn default() -> Self {
        Self {
            fallback_keywords: default_fallback_keywords(),
            max_fallback_branches: default_max_fallback_branches(),
            strategy: Strategy::default(),
            relations: MatchStrategy::default(),
        }
    }
}

impl ServiceConfig {
    /// Default config file location: `$XDG_CONFIG_HOME/synapse-mind/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok()?;
        Some(base.join("synapse-mind").join("config.toml"))
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Load the effective configuration.
    ///
    /// `explicit` wins over `SYNAPSE_CONFIG`, which wins over the XDG path.
    /// A missing explicit file is an error; a missing default file is not.
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("SYNAPSE_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::load(&path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort { value: "0".into() });
        }
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key.trim().to_string());
        }
        if let Some(provider) = lookup("SYNAPSE_LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(bind) = lookup("SYNAPSE_SERVER_BIND") {
            self.server.bind = bind;
        }
        if let Some(port) = lookup("SYNAPSE_SERVER_PORT").or_else(|| lookup("PORT")) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value: port.clone() })?;
        }
        Ok(())
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            api_key: self.llm.api_key.clone(),
            timeout_secs: self.llm.timeout_secs,
        }
    }

    pub fn pipeline(&self) -> MindMapPipeline {
        MindMapPipeline {
            strategy: self.mindmap.strategy,
            relations: self.mindmap.relations,
            fallback: FallbackConfig {
                keywords: self.mindmap.fallback_keywords.clone(),
                max_branches: self.mindmap.max_fallback_branches,
            },
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.llm.min_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// `bind:port` socket address string.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.min_interval_secs, 60);
        assert_eq!(config.mindmap.fallback_keywords.len(), 4);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: ServiceConfig = toml::from_str(
            "[llm]\nprovider = \"mock\"\n\n[mindmap]\nstrategy = \"flat\"\nrelations = \"every-match\"\n",
        )
        .unwrap();
        assert_eq!(config.llm.provider, Provider::Mock);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.mindmap.strategy, Strategy::Flat);
        assert_eq!(config.mindmap.relations, MatchStrategy::EveryMatch);
        assert_eq!(config.text.min_mindmap_chars, 20);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ServiceConfig::default();
        config.server.port = 9100;
        config.cache.ttl_secs = 5;
        config.save(&path).unwrap();
        assert_eq!(ServiceConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(ServiceConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn explicit_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServiceConfig::resolve(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn env_overrides() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(env(&[
                ("GEMINI_API_KEY", " secret "),
                ("SYNAPSE_LLM_PROVIDER", "Mock"),
                ("PORT", "9000"),
            ]))
            .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
        assert_eq!(config.llm.provider, Provider::Mock);
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn synapse_port_wins_over_port() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(env(&[("PORT", "9000"), ("SYNAPSE_SERVER_PORT", "9001")]))
            .unwrap();
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn bad_overrides_are_errors() {
        let mut config = ServiceConfig::default();
        assert!(matches!(
            config.apply_overrides(env(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert!(matches!(
            config.apply_overrides(env(&[("SYNAPSE_LLM_PROVIDER", "openai")])),
            Err(ConfigError::InvalidProvider { .. })
        ));
    }

    #[test]
    fn pipeline_carries_mindmap_section() {
        let mut config = ServiceConfig::default();
        config.mindmap.max_fallback_branches = 1;
        config.mindmap.strategy = Strategy::Flat;
        let pipeline = config.pipeline();
        assert_eq!(pipeline.strategy, Strategy::Flat);
        assert_eq!(pipeline.fallback.max_branches, 1);
        assert_eq!(config.gemini().model, "gemini-2.5-flash");
        assert_eq!(config.listen_addr(), "0.0.0.0:8000");
    }
}
