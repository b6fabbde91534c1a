//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_RETRIEVAL__TOP_K=5`) into the typed
//! [`Settings`] tree. Provides helpers to expand `~` and `${VAR}` and to resolve
//! relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::classifier::ThresholdConfig;
use crate::data_processor::DataConfig;
use crate::error::{Error, Result};
use crate::prompt::PromptConfig;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Wrap an already assembled figment (used by tests and embedders of the crate).
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn from_toml_str(toml: &str) -> Self {
        Self::from_figment(Figment::from(Toml::string(toml)))
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Full typed configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub thresholds: ThresholdConfig,
    pub prompt: PromptConfig,
    pub embedding: EmbeddingConfig,
    pub completion: CompletionConfig,
    pub suggestion: SuggestionConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.thresholds.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be greater than 0".into()));
        }
        if self.completion.model.trim().is_empty() {
            return Err(Error::InvalidConfig("completion.model must not be empty".into()));
        }
        Ok(())
    }

    /// `data.docs_dir`, expanded and resolved against the working directory.
    pub fn docs_dir(&self) -> PathBuf {
        resolve_from_cwd(&self.data.docs_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Capacity of the query-embedding LRU; 0 disables caching.
    pub query_cache_capacity: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3, query_cache_capacity: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_dir: Option<String>,
    pub use_fake: bool,
    /// Token budget per input; longer inputs are truncated.
    pub max_len: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { model_dir: None, use_fake: false, max_len: 256 }
    }
}

impl EmbeddingConfig {
    pub fn model_dir(&self) -> Option<PathBuf> {
        self.model_dir.as_deref().map(resolve_from_cwd)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.3,
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Keyword-triggered hint appended to answers about grievances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub keywords: Vec<String>,
    pub message: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        let keywords = [
            "complaint",
            "report",
            "ragging",
            "harassment",
            "bullying",
            "grievance",
            "mental harassment",
            "fee issue",
            "exam issue",
        ];
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            message: "💡 You can generate an official complaint draft from the 'Complaints' section in your dashboard."
                .to_string(),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

fn resolve_from_cwd(p: &str) -> PathBuf {
    match env::current_dir() {
        Ok(cwd) => resolve_with_base(&cwd, p),
        Err(_) => expand_path(p),
    }
}
