//! Scripted stand-ins for the runtime CLI and the runtime API

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use docker_mcp::deploy::command::{RuntimeCommand, RuntimeLocator};
use docker_mcp::deploy::executor::{CommandExecutor, ExecutionResult, Platform};
use docker_mcp::errors::ServerError;
use docker_mcp::runtime::client::{ContainerSummary, CreatedContainer, RunSpec, RuntimeClient};

pub fn exited(code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
    ExecutionResult {
        exit_code: code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// Locator resolving to an empty file standing in for the runtime
pub fn fake_locator(dir: &Path) -> RuntimeLocator {
    let runtime = dir.join("docker");
    std::fs::write(&runtime, "").unwrap();
    RuntimeLocator::new(Platform::Linux).with_explicit(Some(runtime))
}

/// One recorded compose invocation
#[derive(Debug, Clone)]
pub struct ComposeCall {
    pub subcommand: String,
    pub args: Vec<String>,
    /// Whether the compose file existed when the command ran
    pub file_present: bool,
}

/// Behaves like `docker compose` for a single project: `up` starts the
/// services named in the file, `ps` lists them, `down` removes them and
/// fails when there is nothing to remove.
#[derive(Default)]
pub struct FakeCompose {
    calls: Mutex<Vec<ComposeCall>>,
    services: Mutex<Vec<String>>,
    failures: HashMap<String, i32>,
    unspawnable: HashSet<String>,
}

impl FakeCompose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `subcommand` exit with `code`
    pub fn failing(mut self, subcommand: &str, code: i32) -> Self {
        self.failures.insert(subcommand.to_string(), code);
        self
    }

    /// Make `subcommand` fail to start at all
    pub fn unspawnable(mut self, subcommand: &str) -> Self {
        self.unspawnable.insert(subcommand.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ComposeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn subcommands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.subcommand).collect()
    }

    pub fn running(&self) -> Vec<String> {
        self.services.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for FakeCompose {
    async fn execute(&self, command: &RuntimeCommand) -> Result<ExecutionResult, ServerError> {
        let RuntimeCommand::Argv { args, .. } = command else {
            return Err(ServerError::Internal("expected argv".to_string()));
        };
        let file = PathBuf::from(&args[2]);
        let subcommand = args[5].clone();
        self.calls.lock().unwrap().push(ComposeCall {
            subcommand: subcommand.clone(),
            args: args.clone(),
            file_present: file.is_file(),
        });

        if self.unspawnable.contains(&subcommand) {
            return Err(ServerError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "program not found",
            )));
        }
        if let Some(code) = self.failures.get(&subcommand) {
            return Ok(exited(*code, "", &format!("{} blew up", subcommand)));
        }

        let mut services = self.services.lock().unwrap();
        match subcommand.as_str() {
            "down" if services.is_empty() => Ok(exited(1, "", "no resource found for project")),
            "down" => {
                services.clear();
                Ok(exited(0, "", "Removed"))
            }
            "pull" => Ok(exited(0, "", "Pulled")),
            "up" => {
                let raw = std::fs::read_to_string(&file)?;
                let spec: serde_yaml::Value = serde_yaml::from_str(&raw)
                    .map_err(|e| ServerError::InvalidSpec(e.to_string()))?;
                *services = spec["services"]
                    .as_mapping()
                    .map(|m| {
                        m.keys()
                            .filter_map(|k| k.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(exited(0, "", "Started"))
            }
            "ps" => Ok(exited(0, &services.join("\n"), "")),
            other => Ok(exited(127, "", &format!("unknown command {}", other))),
        }
    }
}

/// Runtime API double with a local image store
#[derive(Default)]
pub struct FakeRuntime {
    pub images: Mutex<HashSet<String>>,
    pub calls: Mutex<Vec<String>>,
    pub runs: Mutex<Vec<RunSpec>>,
    pub delay: Option<Duration>,
    pub run_error: Option<String>,
    pub logs: HashMap<String, String>,
    pub containers: Vec<ContainerSummary>,
    pub list_error: Option<String>,
}

impl FakeRuntime {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntime {
    async fn ping(&self) -> Result<(), ServerError> {
        self.record("ping".to_string());
        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool, ServerError> {
        self.record(format!("image_exists {}", image));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.images.lock().unwrap().contains(image))
    }

    async fn pull_image(&self, image: &str) -> Result<(), ServerError> {
        self.record(format!("pull_image {}", image));
        self.images.lock().unwrap().insert(image.to_string());
        Ok(())
    }

    async fn run_container(&self, spec: &RunSpec) -> Result<CreatedContainer, ServerError> {
        self.record(format!("run_container {}", spec.image));
        if let Some(error) = &self.run_error {
            return Err(ServerError::Internal(error.clone()));
        }
        self.runs.lock().unwrap().push(spec.clone());
        Ok(CreatedContainer {
            id: "f00dfeed1234".to_string(),
            name: spec.name.clone().unwrap_or_else(|| "eager_turing".to_string()),
        })
    }

    async fn container_logs(&self, container: &str, tail: usize) -> Result<String, ServerError> {
        self.record(format!("container_logs {} {}", container, tail));
        self.logs
            .get(container)
            .cloned()
            .ok_or_else(|| ServerError::Internal(format!("No such container: {}", container)))
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ServerError> {
        self.record("list_containers".to_string());
        match &self.list_error {
            Some(error) => Err(ServerError::Internal(error.clone())),
            None => Ok(self.containers.clone()),
        }
    }
}
