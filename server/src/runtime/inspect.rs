//! Read-only runtime queries behind `get-logs` and `list-containers`

use tracing::{debug, error};

use crate::models::container::{ContainerListReport, LogsReport};
use crate::runtime::client::RuntimeClient;

/// Lines of output returned by `get-logs`
pub const LOG_TAIL: usize = 100;

pub async fn get_logs(client: &dyn RuntimeClient, container_name: &str) -> LogsReport {
    let container = container_name.trim();
    if container.is_empty() {
        return LogsReport::Failed {
            container: String::new(),
            error: "Missing required container_name".to_string(),
        };
    }

    debug!("Fetching logs for {}", container);
    match client.container_logs(container, LOG_TAIL).await {
        Ok(logs) => LogsReport::Retrieved {
            container: container.to_string(),
            logs,
        },
        Err(e) => {
            error!("Failed to fetch logs for {}: {}", container, e);
            LogsReport::Failed {
                container: container.to_string(),
                error: e.to_string(),
            }
        }
    }
}

pub async fn list_containers(client: &dyn RuntimeClient) -> ContainerListReport {
    match client.list_containers().await {
        Ok(containers) => {
            debug!("Listed {} containers", containers.len());
            ContainerListReport::Listed(containers)
        }
        Err(e) => {
            error!("Failed to list containers: {}", e);
            ContainerListReport::Failed {
                error: e.to_string(),
            }
        }
    }
}
