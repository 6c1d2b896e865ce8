//! Configuration for providers, planning, context scanning, and execution.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete pipeline configuration.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    /// Hosted model provider settings
    pub provider: ProviderConfig,
    /// Planning behavior
    pub planning: PlanningConfig,
    /// Context scan budget
    pub context: ContextConfig,
    /// Execution defaults
    pub execution: ExecutionConfig,
}

/// Hosted chat-completions service to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// api.openai.com
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// GitHub Models inference endpoint
    GithubModels,
    /// Azure AI Inference deployment (endpoint required)
    AzureInference,
}

impl ProviderKind {
    /// Environment variable consulted when no key is configured.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::GithubModels => "GITHUB_TOKEN",
            Self::AzureInference => "AZURE_AI_API_KEY",
        }
    }

    /// Built-in chat-completions URL, if the service has a fixed one.
    #[must_use]
    pub const fn default_endpoint(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
            Self::GithubModels => Some("https://models.github.ai/inference/chat/completions"),
            Self::AzureInference => None,
        }
    }

    /// Model used when none is configured.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi | Self::AzureInference => "gpt-4o-mini",
            Self::GithubModels => "openai/gpt-4o-mini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(formatter, "openai"),
            Self::GithubModels => write!(formatter, "github_models"),
            Self::AzureInference => write!(formatter, "azure_inference"),
        }
    }
}

/// Hosted model provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Which service to call
    pub kind: ProviderKind,
    /// Model name; the service default when unset
    pub model: Option<String>,
    /// Chat-completions URL override
    pub endpoint: Option<String>,
    /// API key; the kind's environment variable when unset
    pub api_key: Option<String>,
    /// Per-attempt timeout in seconds
    pub timeout_seconds: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            model: None,
            endpoint: None,
            api_key: None,
            timeout_seconds: 60,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl ProviderConfig {
    /// Get the API key, checking config first, then the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| env::var(self.kind.env_var()).ok())
            .filter(|key| !key.is_empty())
    }

    /// Model name to request.
    #[must_use]
    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.kind.default_model().to_owned())
    }

    /// Chat-completions URL to post to.
    ///
    /// # Errors
    /// Returns an error if the kind has no built-in endpoint and none is configured.
    pub fn endpoint_url(&self) -> Result<String> {
        self.endpoint
            .clone()
            .or_else(|| self.kind.default_endpoint().map(str::to_owned))
            .ok_or_else(|| {
                Error::Config(format!(
                    "provider '{}' requires [provider].endpoint to be set",
                    self.kind
                ))
            })
    }

    /// Per-attempt timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Base backoff delay.
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Planning behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Substitute the default plan when the model cannot be reached
    pub allow_fallback: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            allow_fallback: true,
        }
    }
}

/// Context scan budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum directory depth below the target
    pub max_depth: usize,
    /// Maximum number of files listed
    pub max_files: usize,
    /// Maximum number of documentation excerpts
    pub max_excerpts: usize,
    /// Maximum bytes per excerpt
    pub excerpt_bytes: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_files: 500,
            max_excerpts: 3,
            excerpt_bytes: 1_000,
        }
    }
}

/// Execution defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Simulate phase effects unless told otherwise
    pub dry_run: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { dry_run: true }
    }
}

impl PilotConfig {
    /// Get the default config directory path (`~/.taskpilot`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".taskpilot"))
    }

    /// Get the default config file path (`~/.taskpilot/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, creating it with defaults if missing
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or created
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|error| Error::Config(format!("Failed to read config: {error}")))?;
        let config: Self = toml::from_str(&contents)?;

        tracing::debug!(
            "Loaded config from {:?}: provider={}, api_key={}",
            path,
            config.provider.kind,
            if config.provider.api_key.is_some() {
                "present"
            } else {
                "missing"
            }
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                Error::Config(format!("Failed to create config directory: {error}"))
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# taskpilot configuration file\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))
            .map_err(|error| Error::Config(format!("Failed to write config: {error}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = PilotConfig::default();
        assert!(config.execution.dry_run);
        assert!(config.planning.allow_fallback);
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.provider.max_retries, 2);
        assert_eq!(config.context.max_depth, 8);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
[provider]
kind = "github_models"
api_key = "test_token_123"
max_retries = 5

[planning]
allow_fallback = false
"#;

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(toml_content.as_bytes())
            .expect("Failed to write to temp file");

        let config = PilotConfig::load_from_file(temp_file.path())
            .expect("Failed to load config from temp file");

        assert_eq!(config.provider.kind, ProviderKind::GithubModels);
        assert_eq!(config.provider.max_retries, 5);
        assert_eq!(config.provider.timeout_seconds, 60);
        assert!(!config.planning.allow_fallback);
        assert_eq!(config.context, ContextConfig::default());
        assert_eq!(
            config.provider.resolve_api_key(),
            Some("test_token_123".to_owned())
        );
        assert_eq!(config.provider.model_name(), "openai/gpt-4o-mini");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(b"[provider\nkind = ")
            .expect("Failed to write to temp file");

        let result = PilotConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("nested").join("config.toml");

        let mut config = PilotConfig::default();
        config.provider.kind = ProviderKind::AzureInference;
        config.provider.endpoint = Some("https://example.test/chat/completions".to_owned());
        config.execution.dry_run = false;
        config.save_to_file(&path).expect("save");

        let written = fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("# taskpilot configuration file"));

        let loaded = PilotConfig::load_from_file(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let provider = ProviderConfig {
            kind: ProviderKind::AzureInference,
            ..ProviderConfig::default()
        };
        assert!(matches!(provider.endpoint_url(), Err(Error::Config(_))));

        let openai = ProviderConfig::default();
        assert_eq!(
            openai.endpoint_url().expect("builtin endpoint"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_durations() {
        let provider = ProviderConfig {
            timeout_seconds: 3,
            retry_backoff_ms: 250,
            ..ProviderConfig::default()
        };
        assert_eq!(provider.timeout(), Duration::from_secs(3));
        assert_eq!(provider.retry_backoff(), Duration::from_millis(250));
    }
}
