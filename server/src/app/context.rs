//! Shared application context

use std::sync::Arc;

use crate::app::options::AppOptions;
use crate::deploy::command::RuntimeLocator;
use crate::deploy::docker::ContainerLauncher;
use crate::deploy::executor::{executor_for, CommandExecutor};
use crate::deploy::fsm::StepPolicy;
use crate::deploy::orchestrator::ComposeDeployer;
use crate::errors::ServerError;
use crate::runtime::client::RuntimeClient;
use crate::runtime::docker::DockerRuntime;

/// Built once at startup and shared by every tool handler
pub struct AppContext {
    pub deployer: ComposeDeployer,
    pub launcher: ContainerLauncher,
    pub runtime: Arc<dyn RuntimeClient>,
}

impl AppContext {
    pub fn new(
        options: &AppOptions,
        executor: Arc<dyn CommandExecutor>,
        runtime: Arc<dyn RuntimeClient>,
    ) -> Self {
        let locator =
            RuntimeLocator::new(options.deploy.platform).with_explicit(options.deploy.runtime_path.clone());
        let deployer = ComposeDeployer::new(
            executor,
            locator,
            options.deploy.layout.clone(),
            StepPolicy::new(options.deploy.pull_policy),
        );
        let launcher = ContainerLauncher::new(runtime.clone(), options.container.timeout);

        Self {
            deployer,
            launcher,
            runtime,
        }
    }

    /// Context over the host platform's executor and the local Docker daemon
    pub fn init(options: &AppOptions) -> Result<Self, ServerError> {
        let executor = executor_for(options.deploy.platform);
        let runtime: Arc<dyn RuntimeClient> = Arc::new(DockerRuntime::connect()?);
        Ok(Self::new(options, executor, runtime))
    }
}
