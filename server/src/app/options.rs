//! Application configuration options

use std::path::PathBuf;
use std::time::Duration;

use crate::deploy::docker::DEFAULT_TIMEOUT;
use crate::deploy::executor::Platform;
use crate::deploy::fsm::PullPolicy;
use crate::errors::ServerError;
use crate::storage::layout::ScratchLayout;
use crate::storage::settings::{Settings, Transport};

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Protocol transport
    pub transport: Transport,

    /// HTTP transport configuration
    pub server: ServerOptions,

    /// Compose deployment configuration
    pub deploy: DeployOptions,

    /// Single-container configuration
    pub container: ContainerOptions,
}

impl AppOptions {
    /// Resolve settings into typed options. A relative `work_dir` is taken
    /// against the process working directory.
    pub fn from_settings(settings: &Settings) -> Result<Self, ServerError> {
        let layout = match &settings.work_dir {
            Some(dir) => ScratchLayout::new(std::path::absolute(dir)?),
            None => ScratchLayout::from_current_dir()?,
        };

        Ok(Self {
            transport: settings.transport,
            server: ServerOptions {
                host: settings.http.host.clone(),
                port: settings.http.port,
            },
            deploy: DeployOptions {
                platform: Platform::current(),
                layout,
                runtime_path: settings.runtime_path.clone(),
                pull_policy: settings.pull_policy,
            },
            container: ContainerOptions {
                timeout: Duration::from_secs(settings.container_timeout_secs),
            },
        })
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Compose deployment options
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub platform: Platform,

    /// Where scratch files and bind-mount directories live
    pub layout: ScratchLayout,

    /// Explicit runtime executable
    pub runtime_path: Option<PathBuf>,

    pub pull_policy: PullPolicy,
}

#[derive(Debug, Clone)]
pub struct ContainerOptions {
    /// Deadline for ensuring the image and starting the container
    pub timeout: Duration,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
