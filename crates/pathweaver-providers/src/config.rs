//! Configuration and provider/ranker factories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pathweaver_core::paths::RegenerationPolicy;
use pathweaver_core::ranker::{AiRanker, NoopRanker, DEFAULT_MAX_CANDIDATES};
use pathweaver_core::traits::{Ranker, TextGenerator};

use crate::anthropic::AnthropicGenerator;
use crate::ollama::OllamaGenerator;

/// Configuration for a single text-generation provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Where the question bank is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSourceKind {
    /// TOML file at `question_bank_path`.
    File,
    /// The persisted store.
    Store,
}

/// AI ranker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Maximum pool items enumerated in the ranking prompt.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Wall-clock budget for one ranking call in seconds.
    #[serde(default = "default_ranker_timeout")]
    pub timeout_secs: u64,
}

fn default_max_candidates() -> usize {
    DEFAULT_MAX_CANDIDATES
}
fn default_ranker_timeout() -> u64 {
    30
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            timeout_secs: default_ranker_timeout(),
        }
    }
}

/// Top-level pathweaver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathweaverConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for AI ranking.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for AI ranking.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Where the question bank comes from.
    #[serde(default = "default_question_source")]
    pub question_source: QuestionSourceKind,
    /// Bank file when `question_source = "file"`.
    #[serde(default = "default_bank_path")]
    pub question_bank_path: PathBuf,
    /// Data directory for the JSON store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Output directory for regeneration reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Max concurrent per-student regenerations.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// What happens to entry progress on regeneration.
    #[serde(default)]
    pub regeneration_policy: RegenerationPolicy,
    /// AI ranker tuning.
    #[serde(default)]
    pub ranker: RankerConfig,
}

fn default_provider() -> String {
    "anthropic".to_string()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}
fn default_question_source() -> QuestionSourceKind {
    QuestionSourceKind::File
}
fn default_bank_path() -> PathBuf {
    PathBuf::from("question-banks/diagnostic.toml")
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./pathweaver-data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./pathweaver-reports")
}
fn default_parallelism() -> usize {
    4
}

impl Default for PathweaverConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            question_source: default_question_source(),
            question_bank_path: default_bank_path(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            parallelism: default_parallelism(),
            regeneration_policy: RegenerationPolicy::default(),
            ranker: RankerConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `pathweaver.toml` in the current directory
/// 2. `~/.config/pathweaver/config.toml`
///
/// Environment variable override: `PATHWEAVER_ANTHROPIC_KEY`.
pub fn load_config() -> Result<PathweaverConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PathweaverConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("pathweaver.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<PathweaverConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PathweaverConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("PATHWEAVER_ANTHROPIC_KEY") {
        config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Anthropic { api_key, .. }) =
            config.providers.get_mut("anthropic")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("pathweaver"))
}

/// Create a generator instance from its configuration.
pub fn create_generator(config: &ProviderConfig) -> Result<Box<dyn TextGenerator>> {
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            anyhow::ensure!(!api_key.is_empty(), "anthropic provider has no API key");
            Ok(Box::new(AnthropicGenerator::new(api_key, base_url.clone())))
        }
        ProviderConfig::Ollama { base_url } => Ok(Box::new(OllamaGenerator::new(base_url))),
    }
}

/// Build the ranker the configuration asks for.
///
/// Falls back to [`NoopRanker`] when the default provider is missing or
/// unusable, so environments without an API key run the identical
/// pipeline minus AI recommendations.
pub fn build_ranker(config: &PathweaverConfig) -> Arc<dyn Ranker> {
    let Some(provider_config) = config.providers.get(&config.default_provider) else {
        tracing::info!(
            provider = %config.default_provider,
            "no provider configured; AI ranking disabled"
        );
        return Arc::new(NoopRanker);
    };

    match create_generator(provider_config) {
        Ok(generator) => Arc::new(
            AiRanker::new(Arc::from(generator), &config.default_model)
                .with_max_candidates(config.ranker.max_candidates)
                .with_timeout(Duration::from_secs(config.ranker.timeout_secs)),
        ),
        Err(e) => {
            tracing::info!(
                provider = %config.default_provider,
                "provider unusable ({e}); AI ranking disabled"
            );
            Arc::new(NoopRanker)
        }
    }
}
