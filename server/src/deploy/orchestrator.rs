//! Compose stack deployment

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::deploy::command::{ComposeCommandBuilder, RuntimeLocator};
use crate::deploy::compose::preprocess;
use crate::deploy::executor::CommandExecutor;
use crate::deploy::fsm::{DeploymentFsm, Step, StepOutcome, StepPolicy};
use crate::deploy::trace::DeploymentTrace;
use crate::errors::ServerError;
use crate::models::deployment::{DeployOutcome, DeployReport, UNLISTED_SERVICES};
use crate::storage::layout::ScratchLayout;

/// Check a project identity against the runtime's naming rule: lowercase
/// ASCII letters, digits, `-` and `_`, starting with a letter or digit.
pub fn validate_project_name(project_name: &str) -> Result<(), ServerError> {
    let mut chars = project_name.chars();
    let valid_first = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let valid_rest =
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if valid_first && valid_rest {
        Ok(())
    } else {
        Err(ServerError::Precondition(format!(
            "Invalid project_name '{}': use lowercase letters, digits, '-' and '_', starting with a letter or digit",
            project_name
        )))
    }
}

/// Deploys compose specifications through the runtime CLI.
///
/// Runs teardown, pull, bring-up and status in order for each call. Calls for
/// different projects may run concurrently; calls for the same project share
/// a scratch file and must not overlap.
pub struct ComposeDeployer {
    executor: Arc<dyn CommandExecutor>,
    locator: RuntimeLocator,
    layout: ScratchLayout,
    policy: StepPolicy,
}

impl ComposeDeployer {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        locator: RuntimeLocator,
        layout: ScratchLayout,
        policy: StepPolicy,
    ) -> Self {
        Self {
            executor,
            locator,
            layout,
            policy,
        }
    }

    /// Deploy `compose_yaml` as `project_name`. Always returns a report.
    pub async fn deploy(&self, compose_yaml: &str, project_name: &str) -> DeployReport {
        let mut trace = DeploymentTrace::new();
        info!("Deploying compose stack '{}'", project_name);

        let outcome = match self.try_deploy(compose_yaml, project_name, &mut trace).await {
            Ok(services) => {
                info!("Compose stack '{}' deployed", project_name);
                DeployOutcome::Deployed { services }
            }
            Err(e) if e.is_precondition() => {
                warn!("Rejected compose stack '{}': {}", project_name, e);
                DeployOutcome::Failed {
                    error: e.to_string(),
                }
            }
            Err(e) => {
                error!("Compose stack '{}' failed: {}", project_name, e);
                DeployOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        DeployReport {
            project_name: project_name.to_string(),
            outcome,
            trace,
        }
    }

    async fn try_deploy(
        &self,
        compose_yaml: &str,
        project_name: &str,
        trace: &mut DeploymentTrace,
    ) -> Result<String, ServerError> {
        if compose_yaml.trim().is_empty() || project_name.trim().is_empty() {
            return Err(ServerError::Precondition(
                "Missing required compose_yaml or project_name".to_string(),
            ));
        }
        validate_project_name(project_name)?;

        let compose_file = self.layout.compose_file(project_name);
        let builder = ComposeCommandBuilder::new(&self.locator, compose_file.path(), project_name)?;
        debug!("Using runtime {}", builder.runtime().display());

        let scratch = preprocess(compose_yaml, project_name, &self.layout, trace).await?;
        let result = self.run_steps(&builder, trace).await;
        scratch.release(trace).await;
        result
    }

    /// Returns the status step's output, or the placeholder when it failed
    async fn run_steps(
        &self,
        builder: &ComposeCommandBuilder,
        trace: &mut DeploymentTrace,
    ) -> Result<String, ServerError> {
        let mut fsm = DeploymentFsm::new();
        let mut services = UNLISTED_SERVICES.to_string();

        while let Some(step) = fsm.next_step() {
            fsm.begin(step).map_err(ServerError::Internal)?;
            let command = builder.build(step.subcommand(), step.flags());
            debug!("Step {:?}: {}", step, command);

            let outcome = self
                .policy
                .classify(step, self.executor.execute(&command).await);
            fsm.finish(&outcome).map_err(ServerError::Internal)?;

            match outcome {
                StepOutcome::Completed(result) => {
                    trace.record_result(step, &result);
                    if step == Step::Status {
                        services = result.stdout;
                    }
                }
                StepOutcome::Warning { result, message } => {
                    warn!("{} step failed, continuing: {}", step.label(), message);
                    if let Some(result) = &result {
                        trace.record_result(step, result);
                    }
                    trace.record_warning(step, &message);
                }
                StepOutcome::Degraded { result, message } => {
                    warn!("{} step failed: {}", step.label(), message);
                    if let Some(result) = &result {
                        trace.record_result(step, result);
                    }
                    trace.record_warning(step, &message);
                    services = UNLISTED_SERVICES.to_string();
                }
                StepOutcome::Fatal { result, error } => {
                    if let Some(result) = &result {
                        trace.record_result(step, result);
                    }
                    return Err(error);
                }
            }
        }

        debug!(
            "Deployment finished in state {:?} with {} warning(s)",
            fsm.state(),
            fsm.warnings()
        );
        Ok(services)
    }
}
