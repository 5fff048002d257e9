//! Single-container models

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::report::ToolReport;
use crate::runtime::client::ContainerSummary;

/// Arguments of `create-container`.
///
/// Every field accepts `null` and loosely typed values so that bad input is
/// answered with a report rather than rejected by the protocol layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ContainerRequest {
    /// Image reference, e.g. `nginx:latest`
    #[schemars(required)]
    pub image: Option<String>,

    /// Container name; the runtime picks one when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Host port (optionally `port/protocol`) to container port, given as a
    /// number or `port[/protocol]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<BTreeMap<String, Value>>,

    /// Environment variables; numbers and booleans are converted to text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, Value>>,
}

impl ContainerRequest {
    /// Request for `image` with no name, ports or environment
    pub fn for_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Default::default()
        }
    }

    /// The trimmed image reference, empty when absent
    pub fn image_ref(&self) -> &str {
        self.image.as_deref().map(str::trim).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    /// `udp` in any case is UDP; anything else is TCP
    pub fn from_suffix(suffix: &str) -> Self {
        if suffix.eq_ignore_ascii_case("udp") {
            Protocol::Udp
        } else {
            Protocol::Tcp
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Udp => f.write_str("udp"),
        }
    }
}

/// One published port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub host_port: String,
    pub container_port: String,
    pub protocol: Protocol,
}

impl PortMapping {
    /// Key the runtime uses for the container side, e.g. `80/tcp`
    pub fn container_key(&self) -> String {
        format!("{}/{}", self.container_port, self.protocol)
    }
}

/// Outcome of `create-container`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerReport {
    Created { name: String, id: String },

    /// The runtime never answered within the deadline
    TimedOut { seconds: u64 },

    /// The runtime, or validation, rejected the request. `arguments` echoes it.
    Failed { error: String, arguments: String },
}

impl fmt::Display for ContainerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerReport::Created { name, id } => {
                write!(f, "Created container '{}' (ID: {})", name, id)
            }
            ContainerReport::TimedOut { seconds } => {
                write!(f, "Operation timed out after {} seconds", seconds)
            }
            ContainerReport::Failed { error, arguments } => {
                write!(f, "Error creating container: {} | Arguments: {}", error, arguments)
            }
        }
    }
}

impl ToolReport for ContainerReport {
    fn is_error(&self) -> bool {
        !matches!(self, ContainerReport::Created { .. })
    }
}

const LIST_DEBUG: &str = "Listing all Docker containers";

fn fetch_debug(container: &str) -> String {
    format!("Fetching logs for container '{}'", container)
}

/// Outcome of `get-logs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogsReport {
    Retrieved { container: String, logs: String },

    /// `container` is empty when the request named none
    Failed { container: String, error: String },
}

impl fmt::Display for LogsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogsReport::Retrieved { container, logs } => write!(
                f,
                "Logs for container '{}':\n{}\n\nDebug Info:\n{}",
                container,
                logs.trim_end(),
                fetch_debug(container)
            ),
            LogsReport::Failed { container, error } => {
                let debug = if container.is_empty() {
                    String::new()
                } else {
                    fetch_debug(container)
                };
                write!(
                    f,
                    "Error retrieving logs: {}\n\nDebug Information:\n{}",
                    error, debug
                )
            }
        }
    }
}

impl ToolReport for LogsReport {
    fn is_error(&self) -> bool {
        matches!(self, LogsReport::Failed { .. })
    }
}

/// Outcome of `list-containers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerListReport {
    Listed(Vec<ContainerSummary>),
    Failed { error: String },
}

impl fmt::Display for ContainerListReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerListReport::Listed(containers) => {
                let lines: Vec<String> = containers
                    .iter()
                    .map(|c| {
                        let id: String = c.id.chars().take(12).collect();
                        format!("{} - {} - {}", id, c.name, c.state)
                    })
                    .collect();
                write!(
                    f,
                    "All Docker Containers:\n{}\n\nDebug Info:\n{}",
                    lines.join("\n"),
                    LIST_DEBUG
                )
            }
            ContainerListReport::Failed { error } => write!(
                f,
                "Error listing containers: {}\n\nDebug Information:\n{}",
                error, LIST_DEBUG
            ),
        }
    }
}

impl ToolReport for ContainerListReport {
    fn is_error(&self) -> bool {
        matches!(self, ContainerListReport::Failed { .. })
    }
}
