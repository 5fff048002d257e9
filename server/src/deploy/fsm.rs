//! Deployment step sequence and per-step failure policy

use serde::{Deserialize, Serialize};

use crate::deploy::executor::ExecutionResult;
use crate::errors::ServerError;

/// How a failed `pull` step is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullPolicy {
    /// Record the failure and keep going with images already present
    #[default]
    Permissive,

    /// Abort the deployment
    Strict,
}

impl std::str::FromStr for PullPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" => Ok(PullPolicy::Permissive),
            "strict" => Ok(PullPolicy::Strict),
            _ => Err(format!("Invalid pull policy: {}", s)),
        }
    }
}

/// One runtime invocation of the deployment sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Teardown,
    Pull,
    BringUp,
    Status,
}

impl Step {
    /// Steps in execution order
    pub const SEQUENCE: [Step; 4] = [Step::Teardown, Step::Pull, Step::BringUp, Step::Status];

    pub fn subcommand(&self) -> &'static str {
        match self {
            Step::Teardown => "down",
            Step::Pull => "pull",
            Step::BringUp => "up",
            Step::Status => "ps",
        }
    }

    pub fn flags(&self) -> &'static [&'static str] {
        match self {
            Step::Teardown => &["--volumes"],
            Step::Pull => &[],
            Step::BringUp => &["-d"],
            Step::Status => &[],
        }
    }

    /// Heading used in the trace
    pub fn label(&self) -> &'static str {
        match self {
            Step::Teardown => "Down",
            Step::Pull => "Pull",
            Step::BringUp => "Up",
            Step::Status => "Ps",
        }
    }

    fn next(&self) -> Option<Step> {
        match self {
            Step::Teardown => Some(Step::Pull),
            Step::Pull => Some(Step::BringUp),
            Step::BringUp => Some(Step::Status),
            Step::Status => None,
        }
    }
}

/// What a step failure does to the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// Record a warning and continue
    BestEffort,

    /// Abort the remaining steps
    Fatal,

    /// Continue, with the report's service list replaced by a placeholder
    Degrade,
}

/// Classified result of one step
#[derive(Debug)]
pub enum StepOutcome {
    /// Exit code zero
    Completed(ExecutionResult),

    /// Failed, tolerated. `result` is absent when the process never ran.
    Warning {
        result: Option<ExecutionResult>,
        message: String,
    },

    /// Failed, report degraded
    Degraded {
        result: Option<ExecutionResult>,
        message: String,
    },

    /// Failed, deployment aborted
    Fatal {
        result: Option<ExecutionResult>,
        error: ServerError,
    },
}

/// Failure tolerance per step
#[derive(Debug, Clone, Copy, Default)]
pub struct StepPolicy {
    pub pull_policy: PullPolicy,
}

impl StepPolicy {
    pub fn new(pull_policy: PullPolicy) -> Self {
        Self { pull_policy }
    }

    pub fn tolerance(&self, step: Step) -> Tolerance {
        match (step, self.pull_policy) {
            (Step::Teardown, _) => Tolerance::BestEffort,
            (Step::Pull, PullPolicy::Permissive) => Tolerance::BestEffort,
            (Step::Pull, PullPolicy::Strict) => Tolerance::Fatal,
            (Step::BringUp, _) => Tolerance::Fatal,
            (Step::Status, _) => Tolerance::Degrade,
        }
    }

    /// Classify the executor's answer for `step`
    pub fn classify(
        &self,
        step: Step,
        result: Result<ExecutionResult, ServerError>,
    ) -> StepOutcome {
        let (result, error) = match result {
            Ok(result) if result.success() => return StepOutcome::Completed(result),
            Ok(result) => {
                let error = step_error(step, &result);
                (Some(result), error)
            }
            Err(error) => (None, error),
        };

        match self.tolerance(step) {
            Tolerance::BestEffort => StepOutcome::Warning {
                result,
                message: error.to_string(),
            },
            Tolerance::Degrade => StepOutcome::Degraded {
                result,
                message: error.to_string(),
            },
            Tolerance::Fatal => StepOutcome::Fatal { result, error },
        }
    }
}

fn step_error(step: Step, result: &ExecutionResult) -> ServerError {
    let code = result.exit_code;
    let stderr = result.stderr.trim().to_string();
    match step {
        Step::Pull => ServerError::PullFailed { code, stderr },
        Step::BringUp => ServerError::DeployFailed { code, stderr },
        Step::Teardown | Step::Status => ServerError::Internal(format!(
            "{} exited with code {}: {}",
            step.subcommand(),
            code,
            stderr
        )),
    }
}

/// Deployment state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentState {
    /// Nothing run yet
    Pending,

    /// A step is executing
    Running(Step),

    /// Every step finished without a fatal failure
    Deployed,

    /// A fatal failure stopped the sequence
    Failed,
}

/// Enforces strict step ordering for one deployment
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: DeploymentState,
    warnings: u32,
}

impl DeploymentFsm {
    pub fn new() -> Self {
        Self {
            state: DeploymentState::Pending,
            warnings: 0,
        }
    }

    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Number of tolerated step failures so far
    pub fn warnings(&self) -> u32 {
        self.warnings
    }

    /// The step to run next, if any
    pub fn next_step(&self) -> Option<Step> {
        match &self.state {
            DeploymentState::Pending => Some(Step::SEQUENCE[0]),
            DeploymentState::Running(step) => Some(*step),
            DeploymentState::Deployed | DeploymentState::Failed => None,
        }
    }

    /// Mark `step` as started
    pub fn begin(&mut self, step: Step) -> Result<(), String> {
        match self.next_step() {
            Some(expected) if expected == step => {
                self.state = DeploymentState::Running(step);
                Ok(())
            }
            expected => Err(format!(
                "Invalid transition: {:?} -> {:?} (expected {:?})",
                self.state, step, expected
            )),
        }
    }

    /// Record the outcome of the running step and move on
    pub fn finish(&mut self, outcome: &StepOutcome) -> Result<(), String> {
        let DeploymentState::Running(step) = self.state else {
            return Err(format!("Invalid transition: {:?} -> finish", self.state));
        };

        if matches!(
            outcome,
            StepOutcome::Warning { .. } | StepOutcome::Degraded { .. }
        ) {
            self.warnings += 1;
        }

        self.state = match (outcome, step.next()) {
            (StepOutcome::Fatal { .. }, _) => DeploymentState::Failed,
            (_, Some(next)) => DeploymentState::Running(next),
            (_, None) => DeploymentState::Deployed,
        };
        Ok(())
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
