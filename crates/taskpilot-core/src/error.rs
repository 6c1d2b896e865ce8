use core::result::Result as CoreResult;
use std::io::Error as IoError;
use std::path::PathBuf;

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for pipeline operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur anywhere in the task pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The instruction did not contain a recognizable action keyword.
    #[error("Could not interpret instruction: {0}")]
    Interpretation(String),

    /// The context target does not exist.
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The context target exists but cannot be read.
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The context target is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Planning failed and no fallback plan was permitted.
    #[error("Planning failed: {0}")]
    Planning(String),

    /// A single phase's local action failed.
    #[error("Phase '{phase}' failed: {reason}")]
    PhaseExecution {
        /// Name of the failed phase
        phase: String,
        /// What went wrong
        reason: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A model provider encountered an error.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The service answered with a non-success HTTP status.
    #[error("Provider {provider} returned HTTP {status}: {message}")]
    ProviderStatus {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Required API key was not found.
    #[error("API key not found: {0}")]
    MissingApiKey(String),

    /// A model request did not finish in time.
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient errors like network failures, provider errors and timeouts.
    /// HTTP client errors are permanent except 408 and 429.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Provider(_) | Self::Timeout(_) => true,
            Self::ProviderStatus { status, .. } => matches!(*status, 408 | 429) || *status >= 500,
            _ => false,
        }
    }
}
