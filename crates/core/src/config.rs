//! Configuration management for the Unity Companion backend.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - The workspace config file (.companion/config.yaml)
//! - Environment variables (a `.env` file is loaded into the environment first)
//! - Command-line flags (see [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the generator knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .companion/ and the knowledge file)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("gemini" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the provider credential
    pub api_key_env: String,

    /// Provider credential; `None` means the fallback responder answers everything
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Generation tuning
    pub generation: GenerationSettings,

    /// Knowledge file, relative to the workspace unless absolute
    pub knowledge_path: PathBuf,

    /// HTTP server settings
    pub server: ServerSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// Settings applied to every model invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Upper bound on a single model call, in seconds
    pub timeout_secs: u64,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address to bind
    pub bind: String,

    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    knowledge: Option<KnowledgeSection>,
    server: Option<ServerSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    #[serde(rename = "maxTokens")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
    #[serde(rename = "allowedOrigins")]
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            api_key: None,
            generation: GenerationSettings::default(),
            knowledge_path: PathBuf::from("knowledge/conditions.json"),
            server: ServerSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, `.env` and the workspace config file.
    ///
    /// Environment variables:
    /// - `COMPANION_WORKSPACE`: Override workspace path
    /// - `COMPANION_CONFIG`: Path to config file
    /// - `COMPANION_PROVIDER`: LLM provider
    /// - `COMPANION_MODEL`: Model identifier
    /// - `COMPANION_KNOWLEDGE`: Knowledge file path
    /// - `COMPANION_BIND`: Server bind address
    /// - `GEMINI_API_KEY`: Provider credential (name configurable via `llm.apiKeyEnv`)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use companion_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Knowledge file: {:?}", config.knowledge_file());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit paths take precedence over `COMPANION_WORKSPACE` and `COMPANION_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env is the normal case in production
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }

        Self::load_with(workspace, config_file, &|key: &str| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    fn load_with(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("COMPANION_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env("COMPANION_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.companion_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(provider) = env("COMPANION_PROVIDER") {
            config.provider = provider;
        }

        if let Some(model) = env("COMPANION_MODEL") {
            config.model = model;
        }

        if let Some(path) = env("COMPANION_KNOWLEDGE") {
            config.knowledge_path = PathBuf::from(path);
        }

        if let Some(bind) = env("COMPANION_BIND") {
            config.server.bind = bind;
        }

        config.api_key = env(&config.api_key_env).filter(|key| !key.trim().is_empty());

        if config.log_level.is_none() {
            config.log_level = env("RUST_LOG");
        }

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
            if let Some(api_key_env) = llm.api_key_env {
                result.api_key_env = api_key_env;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                result.generation.timeout_secs = timeout_secs;
            }
            if llm.temperature.is_some() {
                result.generation.temperature = llm.temperature;
            }
            if llm.max_tokens.is_some() {
                result.generation.max_tokens = llm.max_tokens;
            }
        }

        if let Some(path) = config_file.knowledge.and_then(|k| k.path) {
            result.knowledge_path = PathBuf::from(path);
        }

        if let Some(server) = config_file.server {
            if let Some(bind) = server.bind {
                result.server.bind = bind;
            }
            if let Some(origins) = server.allowed_origins {
                result.server.allowed_origins = origins;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
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

    /// Get the path to the .companion directory.
    pub fn companion_dir(&self) -> PathBuf {
        self.workspace.join(".companion")
    }

    /// Absolute location of the knowledge file.
    pub fn knowledge_file(&self) -> PathBuf {
        if self.knowledge_path.is_absolute() {
            self.knowledge_path.clone()
        } else {
            self.workspace.join(&self.knowledge_path)
        }
    }

    /// The provider credential, if one is configured.
    ///
    /// Absence is a valid state: the generator then answers from its fallback rules.
    pub fn resolve_api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Parse the configured bind address.
    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            AppError::Config(format!("Invalid bind address {}: {}", self.server.bind, e))
        })
    }

    /// Validate configuration before any component is built.
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
            return Err(AppError::Config("Model identifier cannot be empty".to_string()));
        }

        if self.generation.timeout_secs == 0 {
            return Err(AppError::Config(
                "Generation timeout must be at least one second".to_string(),
            ));
        }

        if let Some(temperature) = self.generation.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(AppError::Config(format!(
                    "Temperature {} is outside 0.0-2.0",
                    temperature
                )));
            }
        }

        self.bind_addr()?;

        Ok(())
    }
}
