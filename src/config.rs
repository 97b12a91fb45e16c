//! toolagent configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main toolagent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion service configuration
    pub llm: LlmConfig,

    /// Invocation loop configuration
    pub agent: AgentConfig,

    /// Remote file tool configuration
    pub remote: RemoteConfig,

    /// Document search configuration
    pub documents: DocumentsConfig,

    /// Web search configuration
    pub web: WebConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the API key environment variable is set. Call this before
    /// any command that talks to the completion service.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .toolagent.yml
        let local_config = PathBuf::from(".toolagent.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/toolagent/toolagent.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("toolagent").join("toolagent.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (only "openai"-compatible chat completions supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// HTTP request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!("Environment variable {} is not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_ms: 120_000,
        }
    }
}

/// Invocation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Directory all file operations are confined to; None means the current directory
    #[serde(rename = "base-dir")]
    pub base_dir: Option<PathBuf>,

    /// Bound on each completion call in milliseconds
    #[serde(rename = "completion-timeout-ms")]
    pub completion_timeout_ms: u64,

    /// Bound on each tool dispatch in milliseconds
    #[serde(rename = "tool-timeout-ms")]
    pub tool_timeout_ms: u64,
}

impl AgentConfig {
    /// Base directory, falling back to the current working directory
    pub fn resolved_base_dir(&self) -> Result<PathBuf> {
        match &self.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            completion_timeout_ms: 120_000,
            tool_timeout_ms: 60_000,
        }
    }
}

/// How the file tools are provided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteMode {
    /// No file tools
    Off,
    /// File tool server in a child process
    Process,
    /// File tools called directly in this process
    InProcess,
}

impl Default for RemoteMode {
    fn default() -> Self {
        if cfg!(windows) {
            RemoteMode::InProcess
        } else {
            RemoteMode::Process
        }
    }
}

/// Remote file tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Transport used for the file tools
    pub mode: RemoteMode,

    /// Server executable; None means this executable
    pub command: Option<PathBuf>,

    /// Arguments passed to the server executable
    pub args: Vec<String>,

    /// Bound on each remote request in milliseconds
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,
}

impl RemoteConfig {
    /// Server executable, falling back to the running binary
    pub fn resolved_command(&self) -> Result<PathBuf> {
        match &self.command {
            Some(cmd) => Ok(cmd.clone()),
            None => std::env::current_exe().context("Failed to locate current executable"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            mode: RemoteMode::default(),
            command: None,
            args: vec!["mcp-server".to_string()],
            request_timeout_ms: 30_000,
        }
    }
}

/// Document search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Retrieval API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the organization id
    #[serde(rename = "organization-id-env")]
    pub organization_id_env: String,

    /// Environment variable containing the pipeline access token
    #[serde(rename = "access-token-env")]
    pub access_token_env: String,

    /// Environment variable containing the pipeline id
    #[serde(rename = "pipeline-id-env")]
    pub pipeline_id_env: String,

    /// Default number of documents to retrieve
    #[serde(rename = "num-results")]
    pub num_results: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.vectorize.io/v1".to_string(),
            organization_id_env: "VECTORIZE_ORGANIZATION_ID".to_string(),
            access_token_env: "VECTORIZE_PIPELINE_ACCESS_TOKEN".to_string(),
            pipeline_id_env: "VECTORIZE_PIPELINE_ID".to_string(),
            num_results: 5,
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Default maximum number of results
    #[serde(rename = "max-results")]
    pub max_results: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self { max_results: 5 }
    }
}
