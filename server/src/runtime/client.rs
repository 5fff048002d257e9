//! Runtime client interface

use async_trait::async_trait;

use crate::errors::ServerError;
use crate::models::container::PortMapping;

/// Everything needed to start one detached container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub name: Option<String>,
    pub ports: Vec<PortMapping>,
    pub environment: Vec<(String, String)>,
}

/// A container the runtime accepted and started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContainer {
    pub id: String,
    pub name: String,
}

/// One line of the container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub state: String,
}

/// Read-only queries and single-container operations against the runtime
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Check that the runtime daemon answers
    async fn ping(&self) -> Result<(), ServerError>;

    async fn image_exists(&self, image: &str) -> Result<bool, ServerError>;

    async fn pull_image(&self, image: &str) -> Result<(), ServerError>;

    /// Create and start a detached container
    async fn run_container(&self, spec: &RunSpec) -> Result<CreatedContainer, ServerError>;

    /// The most recent `tail` lines of a container's output
    async fn container_logs(&self, container: &str, tail: usize) -> Result<String, ServerError>;

    /// All containers, running or not
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ServerError>;
}
