//! Configuration management for the Docschat CLI.
//!
//! Configuration is layered from multiple sources, later sources winning:
//! - Built-in defaults
//! - Config file (`docschat.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The merged `AppConfig` is loaded once per process and immutable
//! thereafter; the answer pipeline receives it at construction time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active generation provider (e.g., "ollama", "openai", "mock")
    pub provider: String,

    /// Model identifier for the active provider
    pub model: String,

    /// API key override (takes precedence over provider env vars)
    pub api_key: Option<String>,

    /// Path to the JSONL corpus backing the in-memory retriever
    pub corpus: Option<PathBuf>,

    /// Retrieval tuning
    pub retrieval: RetrievalSettings,

    /// Query normalizer options
    pub normalizer: NormalizerSettings,

    /// Citation binder options
    pub binder: BinderSettings,

    /// Safety guardrail options
    pub safety: SafetySettings,

    /// Extra synonym table entries merged over the built-in defaults
    #[serde(default)]
    pub synonyms: HashMap<String, Vec<String>>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations from the config file
    pub llm: Option<LlmConfig>,
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of chunks to retrieve per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum relevance score; chunks below are filtered before assembly
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

/// Query normalizer settings. All three recognized options default to on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerSettings {
    #[serde(default = "default_true")]
    pub case_fold: bool,

    #[serde(default = "default_true")]
    pub strip_punctuation: bool,

    #[serde(default = "default_true")]
    pub synonym_expand: bool,
}

/// Citation binder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinderSettings {
    /// Token-overlap ratio a chunk must reach to support a claim segment
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f32,

    /// Policy for claim segments with no supporting chunk:
    /// "flag" (default), "redact", or "reject"
    #[serde(default = "default_unsupported_policy")]
    pub on_unsupported: String,
}

/// Safety guardrail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySettings {
    /// Extra denylist entries merged over the built-in list
    #[serde(default)]
    pub denylist: Vec<String>,

    /// Maximum answer length before word-boundary truncation
    #[serde(default = "default_max_answer_chars")]
    pub max_answer_chars: usize,
}

fn default_top_k() -> usize {
    4
}

fn default_min_score() -> f32 {
    0.20
}

fn default_true() -> bool {
    true
}

fn default_overlap_threshold() -> f32 {
    0.5
}

fn default_unsupported_policy() -> String {
    "flag".to_string()
}

fn default_max_answer_chars() -> usize {
    2000
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: default_min_score(),
        }
    }
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            case_fold: true,
            strip_punctuation: true,
            synonym_expand: true,
        }
    }
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            overlap_threshold: default_overlap_threshold(),
            on_unsupported: default_unsupported_policy(),
        }
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            denylist: Vec::new(),
            max_answer_chars: default_max_answer_chars(),
        }
    }
}

/// LLM configuration from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Claude {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    corpus: Option<String>,
    retrieval: Option<RetrievalSettings>,
    normalizer: Option<NormalizerSettings>,
    binder: Option<BinderSettings>,
    safety: Option<SafetySettings>,
    synonyms: Option<HashMap<String, Vec<String>>>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            corpus: None,
            retrieval: RetrievalSettings::default(),
            normalizer: NormalizerSettings::default(),
            binder: BinderSettings::default(),
            safety: SafetySettings::default(),
            synonyms: HashMap::new(),
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `DOCSCHAT_CONFIG`: Path to config file (default: `./docschat.yaml`)
    /// - `DOCSCHAT_PROVIDER`: Generation provider
    /// - `DOCSCHAT_MODEL`: Model identifier
    /// - `DOCSCHAT_API_KEY`: API key
    /// - `DOCSCHAT_CORPUS`: Path to the JSONL corpus
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("DOCSCHAT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("docschat.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the config file
        if let Ok(provider) = std::env::var("DOCSCHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCSCHAT_MODEL") {
            config.model = model;
        }

        if let Ok(corpus) = std::env::var("DOCSCHAT_CORPUS") {
            config.corpus = Some(PathBuf::from(corpus));
        }

        config.api_key = std::env::var("DOCSCHAT_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(corpus) = config_file.corpus {
            result.corpus = Some(PathBuf::from(corpus));
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(normalizer) = config_file.normalizer {
            result.normalizer = normalizer;
        }

        if let Some(binder) = config_file.binder {
            result.binder = binder;
        }

        if let Some(safety) = config_file.safety {
            result.safety = safety;
        }

        if let Some(synonyms) = config_file.synonyms {
            result.synonyms = synonyms;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Claude { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides, which take precedence over everything else.
    ///
    /// An explicit config file path is merged first, so the remaining flags
    /// still win over its contents. Unlike the implicit `docschat.yaml`, a
    /// file the user asked for must exist and parse.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        corpus: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> AppResult<Self> {
        if let Some(config_file) = config_file {
            self = self.merge_yaml(&config_file)?;
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(corpus) = corpus {
            self.corpus = Some(corpus);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        Ok(self)
    }

    /// Get the configuration for a named provider, if the config file has one.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the endpoint for a named provider, if configured.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider)? {
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint),
            ProviderConfig::OpenAI { endpoint, .. } => endpoint,
            ProviderConfig::Claude { endpoint, .. } => endpoint,
        }
    }

    /// Resolve the API key for a named provider.
    ///
    /// Order: explicit `DOCSCHAT_API_KEY`, then the provider's configured
    /// `apiKeyEnv`, then the provider's conventional environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. })
            | Some(ProviderConfig::Claude { api_key_env, .. }) => Some(api_key_env),
            Some(ProviderConfig::Ollama { .. }) => None,
            None => match provider {
                "openai" => Some("OPENAI_API_KEY".to_string()),
                "claude" | "anthropic" => Some("ANTHROPIC_API_KEY".to_string()),
                _ => None,
            },
        };

        env_var.and_then(|var| std::env::var(var).ok())
    }

    /// Validate configuration for the active provider and binder policy.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "openai", "claude", "anthropic", "mock"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        match self.provider.as_str() {
            "openai" | "claude" | "anthropic" => {
                if self.resolve_api_key(&self.provider).is_none() {
                    return Err(AppError::Config(format!(
                        "Provider '{}' requires an API key (set DOCSCHAT_API_KEY or the provider's key env var)",
                        self.provider
                    )));
                }
            }
            _ => {} // Ollama and mock need no credentials
        }

        let known_policies = ["flag", "redact", "reject"];
        if !known_policies.contains(&self.binder.on_unsupported.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown unsupported-claim policy: {}. Supported: {}",
                self.binder.on_unsupported,
                known_policies.join(", ")
            )));
        }

        if !(0.0..=1.0).contains(&self.binder.overlap_threshold) {
            return Err(AppError::Config(format!(
                "Binder overlap threshold must be in [0.0, 1.0], got {}",
                self.binder.overlap_threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.binder.on_unsupported, "flag");
        assert!(config.normalizer.case_fold);
        assert!(!config.verbose);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config
            .with_overrides(
                None,
                Some("openai".to_string()),
                Some("gpt-4o-mini".to_string()),
                None,
                None,
                true,
                false,
            )
            .unwrap();

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4o-mini");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_with_overrides_loads_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "llm:\n  activeProvider: mock\n  providers: {{}}\nretrieval:\n  top_k: 7"
        )
        .unwrap();

        let config = AppConfig::default()
            .with_overrides(
                Some(file.path().to_path_buf()),
                None,
                None,
                None,
                None,
                false,
                false,
            )
            .unwrap();

        assert_eq!(config.provider, "mock");
        assert_eq!(config.retrieval.top_k, 7);
        assert_eq!(config.config_file.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_with_overrides_flags_beat_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "llm:\n  activeProvider: openai\n  providers: {{}}").unwrap();

        let config = AppConfig::default()
            .with_overrides(
                Some(file.path().to_path_buf()),
                Some("mock".to_string()),
                None,
                None,
                None,
                false,
                false,
            )
            .unwrap();

        assert_eq!(config.provider, "mock");
    }

    #[test]
    fn test_with_overrides_missing_config_file_errors() {
        let result = AppConfig::default().with_overrides(
            Some(PathBuf::from("/nonexistent/docschat.yaml")),
            None,
            None,
            None,
            None,
            false,
            false,
        );

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_anthropic_alias() {
        let mut config = AppConfig::default();
        config.provider = "anthropic".to_string();
        config.api_key = Some("test-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_policy() {
        let mut config = AppConfig::default();
        config.binder.on_unsupported = "ignore".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = AppConfig::default();
        config.binder.overlap_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config_file() {
        let yaml = r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
corpus: data/corpus.jsonl
retrieval:
  top_k: 6
  min_score: 0.3
binder:
  overlap_threshold: 0.4
  on_unsupported: redact
synonyms:
  chroma:
    - chromadb
"#;
        let parsed: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.retrieval.unwrap().top_k, 6);
        assert_eq!(parsed.binder.unwrap().on_unsupported, "redact");
        assert_eq!(parsed.corpus.unwrap(), "data/corpus.jsonl");
        assert_eq!(
            parsed.llm.unwrap().active_provider,
            "ollama".to_string()
        );
        assert_eq!(parsed.synonyms.unwrap()["chroma"], vec!["chromadb"]);
    }
}
