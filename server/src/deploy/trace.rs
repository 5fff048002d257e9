//! Ordered diagnostic log of one deployment

use std::fmt;

use crate::deploy::executor::ExecutionResult;
use crate::deploy::fsm::Step;

/// Append-only trace. Entries keep execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentTrace {
    entries: Vec<String>,
}

impl DeploymentTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Record the block for a step whose process ran to completion
    pub fn record_result(&mut self, step: Step, result: &ExecutionResult) {
        self.entries.extend([
            format!("=== {} Command ===", step.label()),
            format!("Return Code: {}", result.exit_code),
            format!("Stdout: {}", result.stdout.trim_end()),
            format!("Stderr: {}", result.stderr.trim_end()),
        ]);
    }

    pub fn record_warning(&mut self, step: Step, message: &str) {
        self.entries
            .push(format!("Warning during {}: {}", step.subcommand(), message));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the first entry containing `needle`
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.contains(needle))
    }
}

impl fmt::Display for DeploymentTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries.join("\n"))
    }
}
