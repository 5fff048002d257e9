//! Log retrieval and container listing tests

use std::collections::HashMap;

use docker_mcp::models::report::ToolReport;
use docker_mcp::runtime::client::ContainerSummary;
use docker_mcp::runtime::inspect::{get_logs, list_containers, LOG_TAIL};

use crate::fakes::FakeRuntime;

#[tokio::test]
async fn test_get_logs() {
    let runtime = FakeRuntime {
        logs: HashMap::from([("web".to_string(), "ready\nserving\n".to_string())]),
        ..Default::default()
    };

    let report = get_logs(&runtime, "web").await;

    assert!(!report.is_error());
    assert_eq!(
        report.to_string(),
        "Logs for container 'web':\nready\nserving\n\nDebug Info:\nFetching logs for container 'web'"
    );
    assert_eq!(runtime.calls(), vec![format!("container_logs web {}", LOG_TAIL)]);
}

#[tokio::test]
async fn test_get_logs_requires_name() {
    let runtime = FakeRuntime::default();

    let report = get_logs(&runtime, "").await;

    assert!(report.is_error());
    assert!(report
        .to_string()
        .starts_with("Error retrieving logs: Missing required container_name"));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn test_get_logs_unknown_container() {
    let runtime = FakeRuntime::default();

    let report = get_logs(&runtime, "ghost").await;

    assert!(report.is_error());
    let text = report.to_string();
    assert!(text.starts_with("Error retrieving logs:"));
    assert!(text.contains("No such container: ghost"));
}

#[tokio::test]
async fn test_list_containers() {
    let runtime = FakeRuntime {
        containers: vec![
            ContainerSummary {
                id: "aaaaaaaaaaaabbbbbbbb".to_string(),
                name: "web".to_string(),
                state: "running".to_string(),
            },
            ContainerSummary {
                id: "cccccccccccc".to_string(),
                name: "job".to_string(),
                state: "exited".to_string(),
            },
        ],
        ..Default::default()
    };

    let report = list_containers(&runtime).await;

    assert_eq!(
        report.into_result(),
        Ok("All Docker Containers:\naaaaaaaaaaaa - web - running\ncccccccccccc - job - exited\n\nDebug Info:\nListing all Docker containers".to_string())
    );
}

#[tokio::test]
async fn test_list_containers_error() {
    let runtime = FakeRuntime {
        list_error: Some("daemon unavailable".to_string()),
        ..Default::default()
    };

    let report = list_containers(&runtime).await;

    assert!(report.is_error());
    assert!(report
        .to_string()
        .starts_with("Error listing containers: Internal error: daemon unavailable"));
}
