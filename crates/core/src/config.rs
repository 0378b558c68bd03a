//! Configuration management for Clause.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (.clause/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: the contract store and the config
//! file both live under `.clause/` unless overridden.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Model providers the application knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["ollama", "openai", "none"];

/// Embedding providers the application knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 4] = ["none", "mock", "ollama", "openai"];

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// retrieval, answering and CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .clause/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Model provider for answer synthesis ("ollama", "openai", "none")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// API key for the model provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider configurations
    pub llm: Option<LlmConfig>,

    /// Query/corpus embedding settings
    pub embedding: EmbeddingSettings,

    /// Answer synthesis limits
    pub answer: AnswerSettings,

    /// Contract store settings
    pub store: StoreSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(rename = "activeEmbeddingProvider", default)]
    pub active_embedding_provider: Option<String>,

    #[serde(default)]
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
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model used for completions.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Model used for embeddings, if configured.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            Self::OpenAI {
                embedding_model, ..
            }
            | Self::Ollama {
                embedding_model, ..
            } => embedding_model.as_deref(),
        }
    }

    /// Endpoint override, if configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// "none" disables embeddings (lexical-only retrieval)
    pub provider: String,

    /// Provider-specific model name
    pub model: String,

    /// Expected vector length
    pub dimensions: usize,

    /// Endpoint override
    pub endpoint: Option<String>,

    /// Maximum texts per embedding request during corpus loading
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
            batch_size: 32,
        }
    }
}

impl EmbeddingSettings {
    /// Whether a backing embedding model is configured.
    pub fn is_enabled(&self) -> bool {
        self.provider != "none"
    }
}

/// Limits applied by the answer synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnswerSettings {
    /// Results requested from each search path
    pub result_limit: usize,

    /// Candidates passed to the model as context
    pub context_limit: usize,

    /// Candidates cited when the model cannot be used
    pub fallback_citations: usize,

    /// Maximum characters quoted from a candidate in fallback citations
    pub quote_chars: usize,

    /// Word cap on the emitted answer text
    pub word_limit: usize,

    /// Upper bound on a single model call
    pub model_timeout_secs: u64,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            result_limit: 7,
            context_limit: 7,
            fallback_citations: 3,
            quote_chars: 200,
            word_limit: 120,
            model_timeout_secs: 30,
        }
    }
}

/// Contract store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreSettings {
    /// SQLite database path (defaults to .clause/contracts.sqlite)
    pub path: Option<PathBuf>,

    /// Corpus queried when a request names none
    pub default_corpus: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            default_corpus: "NX".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    embedding: Option<EmbeddingSettings>,
    answer: Option<AnswerSettings>,
    store: Option<StoreSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
            llm: None,
            embedding: EmbeddingSettings::default(),
            answer: AnswerSettings::default(),
            store: StoreSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the YAML file and defaults.
    ///
    /// Environment variables:
    /// - `CLAUSE_WORKSPACE`: Override workspace path
    /// - `CLAUSE_CONFIG`: Path to config file
    /// - `CLAUSE_PROVIDER`: Model provider
    /// - `CLAUSE_MODEL`: Model identifier
    /// - `CLAUSE_API_KEY`: API key
    /// - `CLAUSE_DEFAULT_CORPUS`: Corpus used when a question names none
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use clause_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Store: {:?}", config.store_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit paths win over `CLAUSE_WORKSPACE` and `CLAUSE_CONFIG`, and the
    /// YAML file they select is merged before environment values are applied.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        config.workspace = match workspace {
            Some(workspace) => workspace,
            None => std::env::var("CLAUSE_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or(config.workspace),
        };

        config.config_file = config_file.or_else(|| std::env::var("CLAUSE_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.clause_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        Ok(config.apply_env())
    }

    /// Environment variables override YAML config.
    fn apply_env(mut self) -> Self {
        if let Ok(provider) = std::env::var("CLAUSE_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("CLAUSE_MODEL") {
            self.model = model;
        }

        if let Ok(corpus) = std::env::var("CLAUSE_DEFAULT_CORPUS") {
            self.store.default_corpus = corpus;
        }

        self.api_key = std::env::var("CLAUSE_API_KEY").ok();

        if self.log_level.is_none() {
            self.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        self
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merge_file(config_file))
    }

    fn merge_file(mut self, config_file: ConfigFile) -> Self {
        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                self.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(json) = logging.json {
                self.log_json = json;
            }
        }

        if let Some(llm) = config_file.llm {
            self.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                self.model = provider_config.model().to_string();
            }

            // The embedding provider can be picked from the same provider table
            if let Some(ref embedding_provider) = llm.active_embedding_provider {
                self.embedding.provider = embedding_provider.clone();
                if let Some(provider_config) = llm.providers.get(embedding_provider) {
                    if let Some(model) = provider_config.embedding_model() {
                        self.embedding.model = model.to_string();
                    }
                    self.embedding.endpoint = provider_config.endpoint().map(str::to_string);
                }
            }

            self.llm = Some(llm);
        }

        // Explicit sections win over values derived from the provider table
        if let Some(embedding) = config_file.embedding {
            self.embedding = embedding;
        }

        if let Some(answer) = config_file.answer {
            self.answer = answer;
        }

        if let Some(store) = config_file.store {
            self.store = store;
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Get the path to the .clause directory.
    pub fn clause_dir(&self) -> PathBuf {
        self.workspace.join(".clause")
    }

    /// Ensure the .clause directory exists.
    pub fn ensure_clause_dir(&self) -> AppResult<()> {
        let clause_dir = self.clause_dir();
        if !clause_dir.exists() {
            std::fs::create_dir_all(&clause_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .clause directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the SQLite contract store.
    pub fn store_path(&self) -> PathBuf {
        match self.store.path {
            Some(ref path) if path.is_absolute() => path.clone(),
            Some(ref path) => self.workspace.join(path),
            None => self.clause_dir().join("contracts.sqlite"),
        }
    }

    /// Get a provider configuration by name.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the endpoint for a provider, if one is configured.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(ProviderConfig::endpoint)
            .map(str::to_string)
    }

    /// Resolve API key from environment variables.
    ///
    /// Order: `CLAUSE_API_KEY`, the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the openai provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        if provider.eq_ignore_ascii_case("openai") {
            return std::env::var("OPENAI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration.
    ///
    /// Missing API keys are not an error here: an unusable model provider
    /// degrades answers instead of preventing startup.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        let embedding_provider = self.embedding.provider.to_lowercase();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.is_enabled() && self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be positive".to_string(),
            ));
        }

        let answer = &self.answer;
        for (name, value) in [
            ("resultLimit", answer.result_limit),
            ("contextLimit", answer.context_limit),
            ("fallbackCitations", answer.fallback_citations),
            ("quoteChars", answer.quote_chars),
            ("wordLimit", answer.word_limit),
        ] {
            if value == 0 {
                return Err(AppError::Config(format!(
                    "answer.{} must be positive",
                    name
                )));
            }
        }

        if answer.model_timeout_secs == 0 {
            return Err(AppError::Config(
                "answer.modelTimeoutSecs must be positive".to_string(),
            ));
        }

        if self.store.default_corpus.trim().is_empty() {
            return Err(AppError::Config(
                "store.defaultCorpus must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
