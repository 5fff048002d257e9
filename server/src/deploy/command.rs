//! Runtime command construction

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::deploy::executor::Platform;
use crate::errors::ServerError;

/// One runtime invocation, in the representation its executor expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// A single line for the host command interpreter
    Shell(String),

    /// An executable and its arguments, spawned without a shell
    Argv { program: PathBuf, args: Vec<String> },
}

impl fmt::Display for RuntimeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeCommand::Shell(line) => f.write_str(line),
            RuntimeCommand::Argv { program, args } => {
                write!(f, "{}", program.display())?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
        }
    }
}

/// Finds the runtime executable for a platform
#[derive(Debug, Clone)]
pub struct RuntimeLocator {
    platform: Platform,
    explicit: Option<PathBuf>,
}

impl RuntimeLocator {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            explicit: None,
        }
    }

    /// Use this executable instead of probing
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve the executable: explicit path, then well-known install
    /// locations in priority order, then the executable search path.
    pub fn resolve(&self) -> Result<PathBuf, ServerError> {
        if let Some(path) = &self.explicit {
            if path.is_file() {
                return Ok(path.clone());
            }
            return Err(ServerError::RuntimeNotFound(format!(
                "configured runtime {} does not exist",
                path.display()
            )));
        }

        if let Some(path) = well_known_paths(self.platform)
            .into_iter()
            .find(|p| p.is_file())
        {
            debug!("Found runtime at well-known location {}", path.display());
            return Ok(path);
        }

        let path_env = std::env::var_os("PATH").unwrap_or_default();
        search_path(self.platform.runtime_binary(), &path_env).ok_or_else(|| {
            ServerError::RuntimeNotFound(format!(
                "{} is not installed in a known location or on PATH",
                self.platform.runtime_binary()
            ))
        })
    }
}

/// Known install locations per platform, highest priority first
pub fn well_known_paths(platform: Platform) -> Vec<PathBuf> {
    match platform {
        Platform::Windows => {
            let program_files = std::env::var_os("ProgramFiles")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
            vec![program_files
                .join("Docker")
                .join("Docker")
                .join("resources")
                .join("bin")
                .join("docker.exe")]
        }
        Platform::MacOs => vec![
            PathBuf::from("/usr/local/bin/docker"),
            PathBuf::from("/opt/homebrew/bin/docker"),
            PathBuf::from("/Applications/Docker.app/Contents/Resources/bin/docker"),
        ],
        Platform::Linux => vec![
            PathBuf::from("/usr/bin/docker"),
            PathBuf::from("/usr/local/bin/docker"),
        ],
    }
}

/// Look for `binary` in each directory of a search-path value
pub fn search_path(binary: &str, path_env: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_env)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Builds `compose` invocations for one specification file and project
#[derive(Debug, Clone)]
pub struct ComposeCommandBuilder {
    platform: Platform,
    runtime: PathBuf,
    compose_file: PathBuf,
    project_name: String,
}

impl ComposeCommandBuilder {
    /// Resolve the runtime and bind it to a file and project.
    ///
    /// Fails with [`ServerError::RuntimeNotFound`] before any command is run.
    pub fn new(
        locator: &RuntimeLocator,
        compose_file: &Path,
        project_name: &str,
    ) -> Result<Self, ServerError> {
        let runtime = locator.resolve()?;
        Ok(Self::with_runtime(
            locator.platform(),
            runtime,
            compose_file,
            project_name,
        ))
    }

    /// Build with an already resolved runtime executable
    pub fn with_runtime(
        platform: Platform,
        runtime: PathBuf,
        compose_file: &Path,
        project_name: &str,
    ) -> Self {
        Self {
            platform,
            runtime,
            compose_file: compose_file.to_path_buf(),
            project_name: project_name.to_string(),
        }
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    /// Build the command for `subcommand` with extra `flags`
    pub fn build(&self, subcommand: &str, flags: &[&str]) -> RuntimeCommand {
        if self.platform.uses_shell() {
            self.build_shell(subcommand, flags)
        } else {
            self.build_argv(subcommand, flags)
        }
    }

    fn build_argv(&self, subcommand: &str, flags: &[&str]) -> RuntimeCommand {
        let mut args = vec![
            "compose".to_string(),
            "-f".to_string(),
            self.compose_file.display().to_string(),
            "-p".to_string(),
            self.project_name.clone(),
            subcommand.to_string(),
        ];
        args.extend(flags.iter().map(|f| f.to_string()));

        RuntimeCommand::Argv {
            program: self.runtime.clone(),
            args,
        }
    }

    // The interpreter changes into the file's directory so the file argument
    // is relative, which is how the runtime CLI resolves it reliably there.
    fn build_shell(&self, subcommand: &str, flags: &[&str]) -> RuntimeCommand {
        let compose_file = forward_slashes(&self.compose_file);
        let (dir, file) = match compose_file.rsplit_once('/') {
            Some((dir, file)) => (dir.to_string(), file.to_string()),
            None => (".".to_string(), compose_file.clone()),
        };

        let mut line = format!(
            "cd /d \"{}\" && \"{}\" compose -f \"{}\" -p {} {}",
            dir,
            forward_slashes(&self.runtime),
            file,
            self.project_name,
            subcommand
        );
        for flag in flags {
            line.push(' ');
            line.push_str(flag);
        }

        RuntimeCommand::Shell(line)
    }
}

fn forward_slashes(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
