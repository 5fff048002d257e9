//! Docker Engine API client

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, LogsOptions, StartContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use bollard::Docker;
use futures::StreamExt;
use tracing::{debug, info};

use crate::errors::ServerError;
use crate::runtime::client::{ContainerSummary, CreatedContainer, RunSpec, RuntimeClient};

/// [`RuntimeClient`] over the local Docker daemon socket
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect with the platform defaults (`DOCKER_HOST` or the local socket).
    ///
    /// Does not contact the daemon; use [`RuntimeClient::ping`] for that.
    pub fn connect() -> Result<Self, ServerError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

/// Split an image reference into repository and tag. Digests stay whole.
pub fn split_image_reference(image: &str) -> (&str, &str) {
    if image.contains('@') {
        return (image, "");
    }
    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(i) => (&image[..name_start + i], &image[name_start + i + 1..]),
        None => (image, "latest"),
    }
}

#[async_trait]
impl RuntimeClient for DockerRuntime {
    async fn ping(&self) -> Result<(), ServerError> {
        self.docker.ping().await?;
        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool, ServerError> {
        match self.docker.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn pull_image(&self, image: &str) -> Result<(), ServerError> {
        info!("Pulling image {}", image);
        let (from_image, tag) = split_image_reference(image);
        let options = CreateImageOptions {
            from_image: from_image.to_string(),
            tag: tag.to_string(),
            ..Default::default()
        };

        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(progress) = stream.next().await {
            let progress = progress?;
            if let Some(status) = progress.status {
                debug!("Pull progress: {}", status);
            }
        }
        Ok(())
    }

    async fn run_container(&self, spec: &RunSpec) -> Result<CreatedContainer, ServerError> {
        let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();
        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        for mapping in &spec.ports {
            let key = mapping.container_key();
            exposed_ports.insert(key.clone(), HashMap::new());
            port_bindings
                .entry(key)
                .or_insert_with(|| Some(Vec::new()))
                .get_or_insert_with(Vec::new)
                .push(PortBinding {
                    host_ip: None,
                    host_port: Some(mapping.host_port.clone()),
                });
        }

        let config = Config {
            image: Some(spec.image.clone()),
            env: Some(
                spec.environment
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect(),
            ),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = spec.name.as_ref().map(|name| CreateContainerOptions {
            name: name.clone(),
            platform: None,
        });

        let response = self.docker.create_container(options, config).await?;
        self.docker
            .start_container(&response.id, None::<StartContainerOptions<String>>)
            .await?;

        // The runtime picks a name when none was given
        let name = match &spec.name {
            Some(name) => name.clone(),
            None => self
                .docker
                .inspect_container(&response.id, None)
                .await?
                .name
                .map(|n| n.trim_start_matches('/').to_string())
                .unwrap_or_default(),
        };

        info!("Started container {} ({})", name, response.id);
        Ok(CreatedContainer {
            id: response.id,
            name,
        })
    }

    async fn container_logs(&self, container: &str, tail: usize) -> Result<String, ServerError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };

        let mut logs = String::new();
        let mut stream = self.docker.logs(container, Some(options));
        while let Some(chunk) = stream.next().await {
            logs.push_str(&chunk?.to_string());
        }
        Ok(logs)
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ServerError> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(containers
            .into_iter()
            .map(|c| ContainerSummary {
                id: c.id.unwrap_or_default(),
                name: c
                    .names
                    .and_then(|names| names.into_iter().next())
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default(),
                state: c.state.unwrap_or_default(),
            })
            .collect())
    }
}
