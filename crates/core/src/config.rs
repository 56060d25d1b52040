//! Configuration management for the Sift service.
//!
//! Configuration is assembled in layers, later layers winning:
//! - Built-in defaults
//! - A `.env` file in the working directory (loaded into the process env)
//! - A YAML config file (`SIFT_CONFIG`, `--config`, or `./sift.yaml`)
//! - Environment variables
//! - Command-line flags (see [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file picked up from the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "sift.yaml";

/// Serper (Google search) endpoint used unless `search.endpoint` is set.
pub const DEFAULT_SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

const KNOWN_LLM_PROVIDERS: [&str; 2] = ["together", "ollama"];
const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["together", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the values were merged from, if any
    pub config_file: Option<PathBuf>,

    pub server: ServerConfig,
    pub search: SearchConfig,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalConfig,
    pub logging: LoggingConfig,

    /// Directory holding `<id>.yml` prompt overrides
    pub prompts_dir: Option<PathBuf>,

    /// Serper search API key
    #[serde(skip_serializing, default)]
    pub serper_api_key: Option<String>,

    /// Together AI API key (generation and embeddings)
    #[serde(skip_serializing, default)]
    pub together_api_key: Option<String>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Source discovery and article fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search API endpoint
    pub endpoint: String,

    /// Number of result links to keep
    pub max_sources: usize,

    /// Per-article fetch timeout
    pub fetch_timeout_secs: u64,

    /// Upper bound on concurrent article fetches
    pub fetch_concurrency: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SERPER_ENDPOINT.to_string(),
            max_sources: 5,
            fetch_timeout_secs: 10,
            fetch_concurrency: 4,
        }
    }
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name ("together", "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom endpoint, provider default when unset
    pub endpoint: Option<String>,

    pub temperature: f32,
    pub max_tokens: u32,

    /// Deadline for a single model call
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "together".to_string(),
            model: "meta-llama/Llama-3-8b-chat-hf".to_string(),
            endpoint: None,
            temperature: 0.3,
            max_tokens: 256,
            timeout_secs: 60,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name ("together", "ollama", "mock")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Expected vector length
    pub dimensions: usize,

    /// Custom endpoint, provider default when unset
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "together".to_string(),
            model: "BAAI/bge-base-en-v1.5".to_string(),
            dimensions: 768,
            endpoint: None,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of context documents handed to generation
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log filter override (e.g. "debug", "sift=trace")
    pub level: Option<String>,

    /// Disable colored output
    pub no_color: bool,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    server: Option<ServerConfig>,
    search: Option<SearchConfig>,
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingConfig>,
    prompts_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalConfig::default(),
            logging: LoggingConfig::default(),
            prompts_dir: None,
            serper_api_key: None,
            together_api_key: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and environment
    /// variables.
    ///
    /// Environment variables:
    /// - `SIFT_CONFIG`: Path to config file
    /// - `SIFT_HOST` / `SIFT_PORT`: Listener address
    /// - `SIFT_PROVIDER` / `SIFT_MODEL`: Generative model
    /// - `SIFT_EMBEDDING_PROVIDER`: Embedding provider
    /// - `SERPER_API_KEY`, `TOGETHER_API_KEY`: Secrets
    /// - `OLLAMA_URL`: Endpoint for ollama providers
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use sift_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Listening on {}:{}", config.server.host, config.server.port);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("SIFT_CONFIG").ok().map(PathBuf::from));

        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(server) = file.server {
            result.server = server;
        }
        if let Some(search) = file.search {
            result.search = search;
        }
        if let Some(llm) = file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = file.embedding {
            result.embedding = embedding;
        }
        if let Some(retrieval) = file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(logging) = file.logging {
            result.logging = logging;
        }
        if file.prompts_dir.is_some() {
            result.prompts_dir = file.prompts_dir;
        }

        tracing::debug!("Merged config file {:?}", path);

        Ok(result)
    }

    /// Apply environment variables through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("SIFT_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("SIFT_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid SIFT_PORT value: {}", port),
            }
        }

        if let Some(provider) = lookup("SIFT_PROVIDER") {
            self.llm.provider = provider;
        }

        if let Some(model) = lookup("SIFT_MODEL") {
            self.llm.model = model;
        }

        if let Some(provider) = lookup("SIFT_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }

        if let Some(url) = lookup("OLLAMA_URL") {
            if self.llm.provider == "ollama" && self.llm.endpoint.is_none() {
                self.llm.endpoint = Some(url.clone());
            }
            if self.embedding.provider == "ollama" && self.embedding.endpoint.is_none() {
                self.embedding.endpoint = Some(url);
            }
        }

        self.serper_api_key = lookup("SERPER_API_KEY").or(self.serper_api_key.take());
        self.together_api_key = lookup("TOGETHER_API_KEY").or(self.together_api_key.take());

        if let Some(level) = lookup("RUST_LOG") {
            if self.logging.level.is_none() {
                self.logging.level = Some(level);
            }
        }

        if lookup("NO_COLOR").is_some() {
            self.logging.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        json_logs: bool,
    ) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }

        if let Some(port) = port {
            self.server.port = port;
        }

        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.logging.level = Some(log_level);
        }

        if verbose && self.logging.level.is_none() {
            self.logging.level = Some("debug".to_string());
        }

        if no_color {
            self.logging.no_color = true;
        }

        if json_logs {
            self.logging.json = true;
        }

        self
    }

    /// API key for the configured generative model provider.
    pub fn llm_api_key(&self) -> Option<&str> {
        match self.llm.provider.as_str() {
            "together" => self.together_api_key.as_deref(),
            _ => None,
        }
    }

    /// API key for the configured embedding provider.
    pub fn embedding_api_key(&self) -> Option<&str> {
        match self.embedding.provider.as_str() {
            "together" => self.together_api_key.as_deref(),
            _ => None,
        }
    }

    /// Validate configuration before serving.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.serper_api_key.is_none() {
            return Err(AppError::Config(
                "API key not found in environment variable: SERPER_API_KEY".to_string(),
            ));
        }

        let needs_together = self.llm.provider == "together" || self.embedding.provider == "together";
        if needs_together && self.together_api_key.is_none() {
            return Err(AppError::Config(
                "API key not found in environment variable: TOGETHER_API_KEY".to_string(),
            ));
        }

        if self.search.max_sources == 0 {
            return Err(AppError::Config("search.max_sources must be at least 1".to_string()));
        }

        if self.search.fetch_concurrency == 0 {
            return Err(AppError::Config(
                "search.fetch_concurrency must be at least 1".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("retrieval.top_k must be at least 1".to_string()));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
