//! Settings file management

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::deploy::fsm::PullPolicy;
use crate::errors::ServerError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Optional directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Protocol transport
    #[serde(default)]
    pub transport: Transport,

    /// HTTP transport configuration
    #[serde(default)]
    pub http: HttpSettings,

    /// Explicit runtime executable; skips discovery when set
    #[serde(default)]
    pub runtime_path: Option<PathBuf>,

    /// How a failed `pull` step is treated
    #[serde(default)]
    pub pull_policy: PullPolicy,

    /// Deadline for the create-container tool in seconds
    #[serde(default = "default_container_timeout")]
    pub container_timeout_secs: u64,

    /// Base directory for scratch and volume directories
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_container_timeout() -> u64 {
    200
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            log_dir: None,
            transport: Transport::default(),
            http: HttpSettings::default(),
            runtime_path: None,
            pull_policy: PullPolicy::default(),
            container_timeout_secs: default_container_timeout(),
            work_dir: None,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file, or use defaults when no file is given
    pub async fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        match path {
            Some(path) => File::new(path).read_json::<Settings>().await,
            None => Ok(Settings::default()),
        }
    }

    /// Apply `--key=value` command-line overrides on top of the file
    pub fn apply_overrides(&mut self, args: &HashMap<String, String>) -> Result<(), ServerError> {
        for (key, value) in args {
            match key.as_str() {
                "transport" => self.transport = value.parse().map_err(ServerError::ConfigError)?,
                "host" => self.http.host = value.clone(),
                "port" => {
                    self.http.port = value
                        .parse()
                        .map_err(|_| ServerError::ConfigError(format!("Invalid port: {}", value)))?
                }
                "log-level" => self.log_level = value.parse().map_err(ServerError::ConfigError)?,
                "log-dir" => self.log_dir = Some(PathBuf::from(value)),
                "pull-policy" => {
                    self.pull_policy = value.parse().map_err(ServerError::ConfigError)?
                }
                "runtime-path" => self.runtime_path = Some(PathBuf::from(value)),
                "work-dir" => self.work_dir = Some(PathBuf::from(value)),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Protocol transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON-RPC over stdin/stdout
    #[default]
    Stdio,

    /// Streamable HTTP
    Http,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            _ => Err(format!("Invalid transport: {}", s)),
        }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Host to bind to
    #[serde(default = "default_http_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_http_port")]
    pub port: u16,
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}
