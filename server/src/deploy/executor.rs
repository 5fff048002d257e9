//! Process executors
//!
//! Two strategies run a [`RuntimeCommand`] to completion: [`ShellExecutor`]
//! hands a pre-joined string to the host command interpreter, [`ArgvExecutor`]
//! spawns the binary directly. One of them is picked per [`Platform`] at
//! startup and shared by every deployment.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::deploy::command::RuntimeCommand;
use crate::errors::ServerError;

/// Host platform, as far as runtime invocation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Whether runtime commands go through the command interpreter
    pub fn uses_shell(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// File name of the runtime executable
    pub fn runtime_binary(&self) -> &'static str {
        match self {
            Platform::Windows => "docker.exe",
            Platform::MacOs | Platform::Linux => "docker",
        }
    }
}

/// Exit code and captured output of one finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn from_output(output: std::process::Output) -> Self {
        Self {
            // Killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs one external command and waits for it to exit.
///
/// A non-zero exit is a normal result, not an error. Errors are reserved for
/// commands that could not be started or waited on.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &RuntimeCommand) -> Result<ExecutionResult, ServerError>;
}

/// Executes pre-joined command strings through the host interpreter
#[derive(Debug, Default, Clone)]
pub struct ShellExecutor;

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &RuntimeCommand) -> Result<ExecutionResult, ServerError> {
        let RuntimeCommand::Shell(line) = command else {
            return Err(ServerError::Internal(format!(
                "shell executor cannot run argument vector: {}",
                command
            )));
        };
        debug!("Executing through shell: {}", line);

        let mut cmd = interpreter(line);
        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ExecutionResult::from_output(output))
    }
}

#[cfg(windows)]
fn interpreter(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").raw_arg(line);
    cmd
}

#[cfg(not(windows))]
fn interpreter(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

/// Executes a binary directly with an argument vector, no shell involved
#[derive(Debug, Default, Clone)]
pub struct ArgvExecutor;

#[async_trait]
impl CommandExecutor for ArgvExecutor {
    async fn execute(&self, command: &RuntimeCommand) -> Result<ExecutionResult, ServerError> {
        let RuntimeCommand::Argv { program, args } = command else {
            return Err(ServerError::Internal(format!(
                "argv executor cannot run shell string: {}",
                command
            )));
        };
        debug!("Executing: {}", command);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ExecutionResult::from_output(output))
    }
}

/// Pick the executor matching the platform's command representation
pub fn executor_for(platform: Platform) -> Arc<dyn CommandExecutor> {
    if platform.uses_shell() {
        Arc::new(ShellExecutor)
    } else {
        Arc::new(ArgvExecutor)
    }
}
