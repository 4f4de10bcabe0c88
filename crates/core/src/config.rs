//! Configuration management for DocQA.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`DOCQA_CONFIG`, `--config`, or `./docqa.yaml`)
//! - Environment variables
//! - Command-line flags (applied by the binary through [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 4] = ["groq", "openai", "openai-compatible", "ollama"];

/// Origins that are always allowed to call the HTTP API.
const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name ("pretty", "text", "json").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory holding one sub-directory per session
    pub data_dir: PathBuf,

    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Socket address the HTTP server binds to
    pub bind: String,

    /// Normalized CORS origin allow-list
    pub allowed_origins: Vec<String>,

    /// Maximum accepted request body for uploads
    pub max_upload_bytes: usize,

    /// LLM provider ("groq", "openai", "openai-compatible", "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Optional base URL override for the provider
    pub endpoint: Option<String>,

    /// Explicit API key (takes precedence over the provider key variable)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable holding the provider API key
    pub api_key_env: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Deadline for a single model call
    pub llm_timeout_secs: u64,

    /// Optional YAML prompt definition replacing the built-in template
    pub prompt_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    server: Option<ServerSection>,
    storage: Option<StorageSection>,
    llm: Option<LlmSection>,
    prompt: Option<PromptSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
    #[serde(rename = "allowedOrigins")]
    allowed_origins: Option<Vec<String>>,
    #[serde(rename = "maxUploadBytes")]
    max_upload_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageSection {
    #[serde(rename = "dataDir")]
    data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    temperature: Option<f32>,
    #[serde(rename = "maxTokens")]
    max_tokens: Option<u32>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptSection {
    file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    format: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("uploads"),
            config_file: None,
            bind: "0.0.0.0:5000".to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
            max_upload_bytes: 10 * 1024 * 1024,
            provider: "groq".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            endpoint: None,
            api_key: None,
            api_key_env: None,
            temperature: 0.1,
            max_tokens: 1024,
            llm_timeout_secs: 60,
            prompt_file: None,
            log_level: None,
            log_format: LogFormat::Pretty,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and defaults.
    ///
    /// Environment variables:
    /// - `DOCQA_CONFIG`: Path to config file
    /// - `DOCQA_DATA_DIR`: Root of the session directories
    /// - `DOCQA_BIND` / `PORT`: Bind address / port
    /// - `DOCQA_PROVIDER`, `DOCQA_MODEL`, `DOCQA_ENDPOINT`: LLM selection
    /// - `DOCQA_API_KEY`: Explicit API key
    /// - `DOCQA_LLM_TIMEOUT_SECS`: Model call deadline
    /// - `ALLOWED_ORIGINS`, `FRONTEND_URL`: Extra CORS origins
    /// - `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Data dir: {:?}", config.data_dir);
    /// ```
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with(config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration using an arbitrary environment lookup.
    pub fn load_with<F>(config_file: Option<PathBuf>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let config_path = config_file
            .or_else(|| env("DOCQA_CONFIG").map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from("docqa.yaml");
                local.exists().then_some(local)
            });

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config = config.merge_yaml(&path)?;
        }

        // Environment variables override YAML config
        if let Some(data_dir) = env("DOCQA_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Some(bind) = env("DOCQA_BIND") {
            config.bind = bind;
        } else if let Some(port) = env("PORT") {
            config.bind = format!("0.0.0.0:{}", port.trim());
        }

        if let Some(provider) = env("DOCQA_PROVIDER") {
            config.provider = provider;
        }

        if let Some(model) = env("DOCQA_MODEL") {
            config.model = model;
        }

        if let Some(endpoint) = env("DOCQA_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Some(key) = env("DOCQA_API_KEY").filter(|k| !k.trim().is_empty()) {
            config.api_key = Some(key);
        }

        if let Some(timeout) = env("DOCQA_LLM_TIMEOUT_SECS") {
            config.llm_timeout_secs = timeout.trim().parse().map_err(|e| {
                AppError::Config(format!(
                    "Invalid DOCQA_LLM_TIMEOUT_SECS '{}': {}",
                    timeout, e
                ))
            })?;
        }

        let extra_origins = env("ALLOWED_ORIGINS")
            .map(|list| list.split(',').map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        config.add_allowed_origins(extra_origins.into_iter().chain(env("FRONTEND_URL")));

        config.log_level = env("RUST_LOG").or(config.log_level);

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(server) = config_file.server {
            if let Some(bind) = server.bind {
                result.bind = bind;
            }
            if let Some(origins) = server.allowed_origins {
                result.add_allowed_origins(origins);
            }
            if let Some(max) = server.max_upload_bytes {
                result.max_upload_bytes = max;
            }
        }

        if let Some(storage) = config_file.storage {
            if let Some(dir) = storage.data_dir {
                result.data_dir = PathBuf::from(dir);
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if llm.api_key_env.is_some() {
                result.api_key_env = llm.api_key_env;
            }
            if let Some(temperature) = llm.temperature {
                result.temperature = temperature;
            }
            if let Some(max_tokens) = llm.max_tokens {
                result.max_tokens = max_tokens;
            }
            if let Some(timeout) = llm.timeout_secs {
                result.llm_timeout_secs = timeout;
            }
        }

        if let Some(prompt) = config_file.prompt {
            if let Some(file) = prompt.file {
                result.prompt_file = Some(PathBuf::from(file));
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = LogFormat::parse(&format).ok_or_else(|| {
                    AppError::Config(format!("Unknown log format: {}", format))
                })?;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Append origins to the allow-list, normalized and de-duplicated.
    pub fn add_allowed_origins<I, S>(&mut self, origins: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for origin in origins {
            if let Some(normalized) = normalize_origin(origin.as_ref()) {
                if !self.allowed_origins.contains(&normalized) {
                    self.allowed_origins.push(normalized);
                }
            }
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        bind: Option<String>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(bind) = bind {
            self.bind = bind;
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

        self
    }

    /// Name of the environment variable that holds the provider API key.
    pub fn api_key_env_name(&self) -> Option<String> {
        if let Some(ref name) = self.api_key_env {
            return Some(name.clone());
        }

        match self.provider.to_lowercase().as_str() {
            "groq" => Some("GROQ_API_KEY".to_string()),
            "openai" => Some("OPENAI_API_KEY".to_string()),
            _ => None,
        }
    }

    /// Resolve the API key: explicit key first, then the provider variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|key| std::env::var(key).ok())
    }

    /// Resolve the API key using an arbitrary environment lookup.
    pub fn resolve_api_key_with<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        self.api_key_env_name()
            .and_then(|name| env(&name))
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model must not be empty".to_string()));
        }

        if self.bind.trim().is_empty() {
            return Err(AppError::Config("Bind address must not be empty".to_string()));
        }

        if self.llm_timeout_secs == 0 {
            return Err(AppError::Config(
                "LLM timeout must be greater than zero".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(AppError::Config(
                "Maximum upload size must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be within 0.0-2.0, got {}",
                self.temperature
            )));
        }

        Ok(())
    }
}

/// Trim an origin and drop a single trailing slash; empty origins are dropped.
pub fn normalize_origin(origin: &str) -> Option<String> {
    let trimmed = origin.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
