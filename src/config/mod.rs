//! Configuration system (layered: defaults < TOML file < environment).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AgentError;

/// Default output budget for a single tool result, in characters.
pub const DEFAULT_MAX_OUTPUT_CHARS: i64 = 50_000;

const ENV_DOWNLOAD_DIR: &str = "CONNECTOR_AGENT_DOWNLOAD_DIR";
const ENV_MAX_OUTPUT_CHARS: &str = "CONNECTOR_AGENT_MAX_OUTPUT_CHARS";
const ENV_RETRY_CHANNEL: &str = "CONNECTOR_AGENT_RETRY_CHANNEL";
const ENV_INSTRUCTIONS: &str = "CONNECTOR_AGENT_INSTRUCTIONS";

/// Runtime configuration for the tool pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Directory receiving materialized downloads.
    pub download_dir: PathBuf,
    /// Output budget per tool result; `None` or non-positive disables the guard.
    pub max_output_chars: Option<i64>,
    /// Whether the host feeds retryable signals back to the model.
    pub retry_channel: bool,
    /// Overrides what the `get_instructions` tool returns.
    pub instructions: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_output_chars: Some(DEFAULT_MAX_OUTPUT_CHARS),
            retry_channel: true,
            instructions: None,
        }
    }
}

/// On-disk representation; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    download_dir: Option<PathBuf>,
    max_output_chars: Option<i64>,
    retry_channel: Option<bool>,
    instructions: Option<String>,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, AgentError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().apply_env()
    }

    /// Load a TOML file on top of the defaults, then apply the environment.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AgentError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        let _ = dotenvy::dotenv();
        Self::from_toml_str(&raw)?.apply_env()
    }

    /// Parse TOML content on top of the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, AgentError> {
        let file: FileConfig = toml::from_str(raw)
            .map_err(|e| AgentError::Configuration(format!("invalid config file: {e}")))?;
        let mut config = Self::default();
        if let Some(dir) = file.download_dir {
            config.download_dir = dir;
        }
        if file.max_output_chars.is_some() {
            config.max_output_chars = file.max_output_chars;
        }
        if let Some(retry_channel) = file.retry_channel {
            config.retry_channel = retry_channel;
        }
        if file.instructions.is_some() {
            config.instructions = file.instructions;
        }
        Ok(config)
    }

    fn apply_env(self) -> Result<Self, AgentError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, AgentError> {
        if let Some(dir) = var(ENV_DOWNLOAD_DIR).filter(|v| !v.trim().is_empty()) {
            self.download_dir = PathBuf::from(dir);
        }
        if let Some(raw) = var(ENV_MAX_OUTPUT_CHARS) {
            let parsed = raw.trim().parse::<i64>().map_err(|e| {
                AgentError::Configuration(format!("{ENV_MAX_OUTPUT_CHARS}={raw:?}: {e}"))
            })?;
            self.max_output_chars = Some(parsed);
        }
        if let Some(raw) = var(ENV_RETRY_CHANNEL) {
            self.retry_channel = parse_bool(&raw).ok_or_else(|| {
                AgentError::Configuration(format!("{ENV_RETRY_CHANNEL}={raw:?}: expected a boolean"))
            })?;
        }
        if let Some(instructions) = var(ENV_INSTRUCTIONS).filter(|v| !v.trim().is_empty()) {
            self.instructions = Some(instructions);
        }
        Ok(self)
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_max_output_chars(mut self, max_chars: Option<i64>) -> Self {
        self.max_output_chars = max_chars;
        self
    }

    pub fn with_retry_channel(mut self, available: bool) -> Self {
        self.retry_channel = available;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_download_dir() -> PathBuf {
    directories::ProjectDirs::from("io", "airbyte", "connector-agent")
        .map(|dirs| dirs.cache_dir().join("downloads"))
        .unwrap_or_else(|| std::env::temp_dir().join("connector-agent-downloads"))
}
