//! docker-mcp - Entry Point
//!
//! MCP server exposing container deployment tools over stdio or HTTP.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use docker_mcp::app::options::AppOptions;
use docker_mcp::app::run::run;
use docker_mcp::logs::{init_logging, LogOptions};
use docker_mcp::storage::settings::Settings;
use docker_mcp::utils::{run_diagnostic, version_info};

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to render version: {e}"),
        }
        return;
    }

    // Retrieve the settings
    let settings_path = cli_args.get("settings").map(Path::new);
    let mut settings = match Settings::load(settings_path).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = settings.apply_overrides(&cli_args) {
        eprintln!("{e}");
        std::process::exit(2);
    }

    let options = match AppOptions::from_settings(&settings) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Run diagnostics
    if cli_args.contains_key("diagnostic") || cli_args.contains_key("diag") {
        run_diagnostic(&options).await;
        return;
    }

    // Initialize logging. Stdout belongs to the stdio transport.
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        stderr: true,
        log_dir: settings.log_dir.clone(),
        json_format: settings.log_json,
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    info!("Running docker-mcp with options: {:?}", options);
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Failed to run the server: {e}");
        std::process::exit(1);
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
        info!("Ctrl+C received, shutting down...");
    }
}
