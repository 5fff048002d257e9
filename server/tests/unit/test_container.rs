//! Single-container launch tests

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use docker_mcp::deploy::docker::{ContainerLauncher, DEFAULT_TIMEOUT};
use docker_mcp::models::container::{ContainerReport, ContainerRequest, PortMapping, Protocol};
use docker_mcp::models::report::ToolReport;
use serde_json::json;

use crate::fakes::FakeRuntime;

fn request(image: &str) -> ContainerRequest {
    ContainerRequest::for_image(image)
}

#[tokio::test]
async fn test_missing_image_is_pulled_then_run() {
    let runtime = Arc::new(FakeRuntime::default());
    let launcher = ContainerLauncher::new(runtime.clone(), DEFAULT_TIMEOUT);

    let mut req = request("nginx:latest");
    req.name = Some("web".to_string());
    req.ports = Some(BTreeMap::from([
        ("8080".to_string(), json!(80)),
        ("5353/udp".to_string(), json!("53")),
    ]));
    req.environment = Some(BTreeMap::from([
        ("MODE".to_string(), json!("prod")),
        ("WORKERS".to_string(), json!(4)),
    ]));

    let report = launcher.create(&req).await;

    assert_eq!(
        report,
        ContainerReport::Created {
            name: "web".to_string(),
            id: "f00dfeed1234".to_string()
        }
    );
    assert_eq!(report.to_string(), "Created container 'web' (ID: f00dfeed1234)");
    assert_eq!(
        runtime.calls(),
        vec![
            "image_exists nginx:latest",
            "pull_image nginx:latest",
            "run_container nginx:latest"
        ]
    );

    let runs = runtime.runs.lock().unwrap();
    assert_eq!(
        runs[0].ports,
        vec![
            PortMapping {
                host_port: "5353".to_string(),
                container_port: "53".to_string(),
                protocol: Protocol::Udp,
            },
            PortMapping {
                host_port: "8080".to_string(),
                container_port: "80".to_string(),
                protocol: Protocol::Tcp,
            },
        ]
    );
    assert_eq!(
        runs[0].environment,
        vec![
            ("MODE".to_string(), "prod".to_string()),
            ("WORKERS".to_string(), "4".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_present_image_is_not_pulled() {
    let runtime = Arc::new(FakeRuntime::default());
    runtime.images.lock().unwrap().insert("alpine".to_string());
    let launcher = ContainerLauncher::new(runtime.clone(), DEFAULT_TIMEOUT);

    let report = launcher.create(&request("alpine")).await;

    assert!(!report.is_error());
    assert_eq!(report.to_string(), "Created container 'eager_turing' (ID: f00dfeed1234)");
    assert_eq!(runtime.calls(), vec!["image_exists alpine", "run_container alpine"]);
}

#[tokio::test]
async fn test_empty_image_makes_no_runtime_call() {
    let runtime = Arc::new(FakeRuntime::default());
    let launcher = ContainerLauncher::new(runtime.clone(), DEFAULT_TIMEOUT);

    let report = launcher.create(&request("  ")).await;

    assert!(report.is_error());
    assert!(report
        .to_string()
        .starts_with("Error creating container: Image name cannot be empty | Arguments: {"));
    assert!(runtime.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_runtime_times_out() {
    let runtime = Arc::new(FakeRuntime {
        delay: Some(Duration::from_secs(30)),
        ..Default::default()
    });
    let launcher = ContainerLauncher::new(runtime.clone(), Duration::from_secs(5));

    let report = launcher.create(&request("nginx")).await;

    assert_eq!(report, ContainerReport::TimedOut { seconds: 5 });
    assert_eq!(report.to_string(), "Operation timed out after 5 seconds");
    assert!(report.is_error());
    assert_eq!(runtime.calls(), vec!["image_exists nginx"]);
}

#[tokio::test]
async fn test_runtime_rejection_echoes_request() {
    let runtime = Arc::new(FakeRuntime {
        run_error: Some("Conflict. The container name \"/web\" is already in use".to_string()),
        ..Default::default()
    });
    let launcher = ContainerLauncher::new(runtime, DEFAULT_TIMEOUT);

    let mut req = request("nginx");
    req.name = Some("web".to_string());
    let report = launcher.create(&req).await;

    let ContainerReport::Failed { error, arguments } = &report else {
        panic!("expected failure, got {:?}", report);
    };
    assert!(error.contains("already in use"));
    let echoed: serde_json::Value = serde_json::from_str(arguments).unwrap();
    assert_eq!(echoed["image"], "nginx");
    assert_eq!(echoed["name"], "web");
}

#[tokio::test]
async fn test_malformed_port_mapping_fails_before_runtime() {
    let runtime = Arc::new(FakeRuntime::default());
    let launcher = ContainerLauncher::new(runtime.clone(), DEFAULT_TIMEOUT);

    let mut req = request("nginx");
    req.ports = Some(BTreeMap::from([("80/tcp/extra".to_string(), json!("80"))]));
    let report = launcher.create(&req).await;

    assert!(report.to_string().contains("Invalid port mapping"));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn test_null_image_is_reported_not_rejected() {
    let runtime = Arc::new(FakeRuntime::default());
    let launcher = ContainerLauncher::new(runtime.clone(), DEFAULT_TIMEOUT);

    let req: ContainerRequest = serde_json::from_value(json!({"image": null})).unwrap();
    let report = launcher.create(&req).await;

    assert!(report.is_error());
    assert!(report
        .to_string()
        .starts_with("Error creating container: Image name cannot be empty | Arguments: {"));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn test_boolean_port_value_is_reported() {
    let runtime = Arc::new(FakeRuntime::default());
    let launcher = ContainerLauncher::new(runtime.clone(), DEFAULT_TIMEOUT);

    let req: ContainerRequest =
        serde_json::from_value(json!({"image": "nginx", "ports": {"8080": true}})).unwrap();
    let report = launcher.create(&req).await;

    let ContainerReport::Failed { error, arguments } = &report else {
        panic!("expected failure, got {:?}", report);
    };
    assert_eq!(error, "Invalid port mapping: 8080:true");
    let echoed: serde_json::Value = serde_json::from_str(arguments).unwrap();
    assert_eq!(echoed["ports"], json!({"8080": true}));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn test_null_environment_value_is_reported() {
    let runtime = Arc::new(FakeRuntime::default());
    let launcher = ContainerLauncher::new(runtime.clone(), DEFAULT_TIMEOUT);

    let req: ContainerRequest =
        serde_json::from_value(json!({"image": "nginx", "environment": {"MODE": null}})).unwrap();
    let report = launcher.create(&req).await;

    assert!(report.is_error());
    assert!(report.to_string().contains("Invalid environment value for 'MODE'"));
    assert!(runtime.calls().is_empty());
}
