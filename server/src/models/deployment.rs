//! Deployment models

use std::fmt;

use crate::deploy::trace::DeploymentTrace;
use crate::models::report::ToolReport;

/// Placeholder for the service list when the status step fails
pub const UNLISTED_SERVICES: &str = "Unable to list services";

/// How a deployment ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// `services` is the status step's output, or [`UNLISTED_SERVICES`]
    Deployed { services: String },
    Failed { error: String },
}

/// Outcome of `deploy-compose`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub project_name: String,
    pub outcome: DeployOutcome,
    pub trace: DeploymentTrace,
}

impl DeployReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, DeployOutcome::Deployed { .. })
    }
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            DeployOutcome::Deployed { services } => write!(
                f,
                "Successfully deployed compose stack '{}'\nRunning services:\n{}\n\nDebug Info:\n{}",
                self.project_name,
                services.trim_end(),
                self.trace
            ),
            DeployOutcome::Failed { error } => write!(
                f,
                "Error deploying compose stack: {}\n\nDebug Information:\n{}",
                error, self.trace
            ),
        }
    }
}

impl ToolReport for DeployReport {
    fn is_error(&self) -> bool {
        !self.succeeded()
    }
}
