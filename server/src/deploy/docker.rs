//! Single-container launches

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::ServerError;
use crate::models::container::{ContainerReport, ContainerRequest, PortMapping, Protocol};
use crate::runtime::client::{CreatedContainer, RunSpec, RuntimeClient};

/// Ceiling for ensuring the image and starting the container
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(200);

/// Split `port[/protocol]`. More than one `/` or an empty port is malformed.
fn split_protocol<'a>(raw: &'a str, original: &str) -> Result<(&'a str, Option<&'a str>), ServerError> {
    let mut parts = raw.trim().split('/');
    let port = parts.next().unwrap_or_default();
    let protocol = parts.next();
    if port.is_empty() || parts.next().is_some() || protocol.is_some_and(str::is_empty) {
        return Err(ServerError::MalformedPortMapping(original.to_string()));
    }
    Ok((port, protocol))
}

/// Parse one caller mapping. The container side is a non-negative integer or
/// `port[/protocol]`. The protocol comes from whichever side carries a suffix,
/// the host key first; the default is tcp.
pub fn parse_port_mapping(host_key: &str, value: &Value) -> Result<PortMapping, ServerError> {
    let original = match value {
        Value::String(s) => format!("{}:{}", host_key, s),
        other => format!("{}:{}", host_key, other),
    };

    let (host_port, host_protocol) = split_protocol(host_key, &original)?;
    let (container_port, container_protocol) = match value {
        Value::Number(n) if n.is_u64() => (n.to_string(), None),
        Value::String(s) => {
            let (port, protocol) = split_protocol(s, &original)?;
            (port.to_string(), protocol)
        }
        _ => return Err(ServerError::MalformedPortMapping(original)),
    };

    let protocol = host_protocol
        .or(container_protocol)
        .map(Protocol::from_suffix)
        .unwrap_or_default();

    Ok(PortMapping {
        host_port: host_port.to_string(),
        container_port,
        protocol,
    })
}

pub fn parse_port_mappings(
    ports: Option<&BTreeMap<String, Value>>,
) -> Result<Vec<PortMapping>, ServerError> {
    ports
        .into_iter()
        .flatten()
        .map(|(host_key, value)| parse_port_mapping(host_key, value))
        .collect()
}

/// Environment as `(key, value)` pairs. Numbers and booleans become text;
/// `null`, lists and objects are rejected.
pub fn parse_environment(
    environment: Option<&BTreeMap<String, Value>>,
) -> Result<Vec<(String, String)>, ServerError> {
    environment
        .into_iter()
        .flatten()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ServerError::Precondition(format!(
                        "Invalid environment value for '{}': {}",
                        key, other
                    )))
                }
            };
            Ok((key.clone(), value))
        })
        .collect()
}

/// Launches one detached container from an image
pub struct ContainerLauncher {
    client: Arc<dyn RuntimeClient>,
    timeout: Duration,
}

impl ContainerLauncher {
    pub fn new(client: Arc<dyn RuntimeClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Create and start a container. Always returns a report.
    pub async fn create(&self, request: &ContainerRequest) -> ContainerReport {
        match self.try_create(request).await {
            Ok(created) => {
                info!("Created container {} ({})", created.name, created.id);
                ContainerReport::Created {
                    name: created.name,
                    id: created.id,
                }
            }
            Err(e) if e.is_timeout() => {
                error!("Creating container from {} timed out", request.image_ref());
                ContainerReport::TimedOut {
                    seconds: self.timeout.as_secs(),
                }
            }
            Err(e) => {
                if e.is_precondition() {
                    warn!("Rejected create-container request: {}", e);
                } else {
                    error!("Creating container from {} failed: {}", request.image_ref(), e);
                }
                ContainerReport::Failed {
                    error: e.to_string(),
                    arguments: serde_json::to_string(request).unwrap_or_default(),
                }
            }
        }
    }

    async fn try_create(&self, request: &ContainerRequest) -> Result<CreatedContainer, ServerError> {
        let image = request.image_ref();
        if image.is_empty() {
            return Err(ServerError::Precondition(
                "Image name cannot be empty".to_string(),
            ));
        }

        let spec = RunSpec {
            image: image.to_string(),
            name: request
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            ports: parse_port_mappings(request.ports.as_ref())?,
            environment: parse_environment(request.environment.as_ref())?,
        };

        tokio::time::timeout(self.timeout, self.ensure_and_run(&spec))
            .await
            .map_err(|_| ServerError::Timeout(self.timeout))?
    }

    async fn ensure_and_run(&self, spec: &RunSpec) -> Result<CreatedContainer, ServerError> {
        if !self.client.image_exists(&spec.image).await? {
            info!("Image {} not present locally", spec.image);
            self.client.pull_image(&spec.image).await?;
        }
        self.client.run_container(spec).await
    }
}
