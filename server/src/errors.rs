//! Error types for the docker-mcp server

use std::time::Duration;

use thiserror::Error;

/// Main error type for the docker-mcp server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Docker API error: {0}")]
    DockerApi(#[from] bollard::errors::Error),

    /// A required field is missing or empty. Raised before any side effect.
    #[error("{0}")]
    Precondition(String),

    /// The declarative specification could not be parsed.
    #[error("Invalid YAML format: {0}")]
    InvalidSpec(String),

    /// The runtime executable could not be located.
    #[error("Docker executable not found: {0}")]
    RuntimeNotFound(String),

    #[error("Pull failed with code {code}: {stderr}")]
    PullFailed { code: i32, stderr: String },

    #[error("Deploy failed with code {code}: {stderr}")]
    DeployFailed { code: i32, stderr: String },

    #[error("Invalid port mapping: {0}")]
    MalformedPortMapping(String),

    #[error("Operation timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// True when the runtime never answered within the deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ServerError::Timeout(_))
    }

    /// True for caller input rejected before the runtime was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ServerError::Precondition(_)
                | ServerError::InvalidSpec(_)
                | ServerError::MalformedPortMapping(_)
        )
    }
}
