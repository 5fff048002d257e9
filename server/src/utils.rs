//! Utility functions

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::app::options::AppOptions;
use crate::deploy::command::RuntimeLocator;
use crate::runtime::client::RuntimeClient;
use crate::runtime::docker::DockerRuntime;

/// Version information for the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Print whether the runtime executable and daemon are usable
pub async fn run_diagnostic(options: &AppOptions) {
    println!("{}", "docker-mcp diagnostics".bold());

    let locator = RuntimeLocator::new(options.deploy.platform)
        .with_explicit(options.deploy.runtime_path.clone());
    match locator.resolve() {
        Ok(path) => println!("  {} Docker executable: {}", "✓".green(), path.display()),
        Err(e) => println!("  {} {}", "✗".red().bold(), e),
    }

    match DockerRuntime::connect() {
        Ok(runtime) => match runtime.ping().await {
            Ok(()) => println!("  {} Docker daemon reachable", "✓".green()),
            Err(e) => println!("  {} Docker daemon unreachable: {}", "✗".red().bold(), e),
        },
        Err(e) => println!("  {} Docker client: {}", "✗".red().bold(), e),
    }

    println!(
        "  Scratch directory: {}",
        options.deploy.layout.compose_dir().path().display()
    );
    println!("  Pull policy: {:?}", options.deploy.pull_policy);
}
