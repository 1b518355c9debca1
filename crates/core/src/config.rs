//! Configuration management for ragdex.
//!
//! Configuration is merged from three sources, later ones winning:
//! - built-in defaults
//! - the workspace config file (`.ragdex/config.yaml`)
//! - environment variables, then command-line flags
//!
//! The embedding provider credential and the vector store connection string
//! only ever come from the environment. `validate` must pass before any
//! ingestion or retrieval work starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default environment variable holding the embedding provider credential.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default environment variable holding the vector store connection string.
pub const DEFAULT_STORE_URL_ENV: &str = "RAGDEX_STORE_URL";

/// Providers the client factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["openai", "ollama", "trigram"];

/// Similarity metrics an index can be created with.
pub const KNOWN_METRICS: [&str; 3] = ["cosine", "dotproduct", "euclidean"];

/// Map a metric name or one of its aliases (`dot`, `inner`, `l2`) to the
/// canonical name in [`KNOWN_METRICS`]. Case-insensitive.
pub fn canonical_metric(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "cosine" => Some("cosine"),
        "dotproduct" | "dot" | "inner" => Some("dotproduct"),
        "euclidean" | "l2" => Some("euclidean"),
        _ => None,
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .ragdex/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Provider credential, resolved from `embedding.api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable the store connection string is read from
    pub store_url_env: String,

    /// Vector store connection string
    #[serde(skip_serializing)]
    pub store_url: Option<String>,

    /// Name of the index documents are written to and searched in
    pub index_name: String,

    /// Similarity metric used when the index is created
    pub metric: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format ("pretty" or "json")
    pub log_format: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name: "openai", "ollama" or "trigram"
    pub provider: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Expected embedding length
    pub dimensions: usize,

    /// Optional custom API endpoint
    pub endpoint: Option<String>,

    /// Environment variable holding the credential
    pub api_key_env: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl EmbeddingSettings {
    /// Whether the provider refuses to work without a credential.
    pub fn requires_api_key(&self) -> bool {
        self.provider.eq_ignore_ascii_case("openai")
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    embedding: Option<EmbeddingSection>,
    store: Option<StoreSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreSection {
    #[serde(rename = "urlEnv")]
    url_env: Option<String>,
    index: Option<String>,
    metric: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    format: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            embedding: EmbeddingSettings::default(),
            api_key: None,
            store_url_env: DEFAULT_STORE_URL_ENV.to_string(),
            store_url: None,
            index_name: "documents".to_string(),
            metric: "cosine".to_string(),
            log_level: None,
            log_format: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `RAGDEX_WORKSPACE`: Override workspace path
    /// - `RAGDEX_CONFIG`: Path to config file
    /// - `RAGDEX_PROVIDER`, `RAGDEX_MODEL`, `RAGDEX_DIMENSIONS`: Embedding settings
    /// - `RAGDEX_INDEX`: Index name
    /// - `RAGDEX_API_KEY`: Provider credential, checked before `apiKeyEnv`
    /// - `OPENAI_API_KEY` (or the configured `apiKeyEnv`): Provider credential
    /// - `RAGDEX_STORE_URL` (or the configured `urlEnv`): Store connection string
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use ragdex_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {}", config.index_name);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `env` as the variable lookup.
    pub fn load_with<F>(env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = env("RAGDEX_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Some(config_file) = env("RAGDEX_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.ragdex_dir().join("config.yaml"));

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(provider) = env("RAGDEX_PROVIDER") {
            config.embedding.provider = provider;
        }

        if let Some(model) = env("RAGDEX_MODEL") {
            config.embedding.model = model;
        }

        if let Some(dimensions) = env("RAGDEX_DIMENSIONS") {
            config.embedding.dimensions = dimensions.parse().map_err(|_| {
                AppError::Config(format!("RAGDEX_DIMENSIONS is not a number: {}", dimensions))
            })?;
        }

        if let Some(index) = env("RAGDEX_INDEX") {
            config.index_name = index;
        }

        config.api_key = env("RAGDEX_API_KEY").or_else(|| env(&config.embedding.api_key_env));
        config.store_url = env(&config.store_url_env);

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                self.embedding.provider = provider;
            }
            if let Some(model) = embedding.model {
                self.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                self.embedding.dimensions = dimensions;
            }
            if embedding.endpoint.is_some() {
                self.embedding.endpoint = embedding.endpoint;
            }
            if let Some(api_key_env) = embedding.api_key_env {
                self.embedding.api_key_env = api_key_env;
            }
        }

        if let Some(store) = file.store {
            if let Some(url_env) = store.url_env {
                self.store_url_env = url_env;
            }
            if let Some(index) = store.index {
                self.index_name = index;
            }
            if let Some(metric) = store.metric {
                self.metric = metric;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if logging.format.is_some() {
                self.log_format = logging.format;
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over both the config file and the environment.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        index: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(provider) = provider {
            self.embedding.provider = provider;
        }

        if let Some(model) = model {
            self.embedding.model = model;
        }

        if let Some(index) = index {
            self.index_name = index;
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

        self
    }

    /// Get the path to the .ragdex directory.
    pub fn ragdex_dir(&self) -> PathBuf {
        self.workspace.join(".ragdex")
    }

    /// Validate that everything needed to talk to the provider and the store
    /// is present.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.embedding.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if canonical_metric(&self.metric).is_none() {
            return Err(AppError::Config(format!(
                "Unknown similarity metric: {}. Supported: {} (aliases: dot, inner, l2)",
                self.metric,
                KNOWN_METRICS.join(", ")
            )));
        }

        if self.index_name.trim().is_empty() {
            return Err(AppError::Config("Index name must not be empty".to_string()));
        }

        if self.embedding.requires_api_key() && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "{} is not set in environment variables",
                self.embedding.api_key_env
            )));
        }

        if self.store_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
            return Err(AppError::Config(format!(
                "{} is not set in environment variables",
                self.store_url_env
            )));
        }

        Ok(())
    }
}
