//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::context::AppContext;
use crate::app::options::AppOptions;
use crate::errors::ServerError;
use crate::server::serve::{serve_http, serve_stdio};
use crate::storage::settings::Transport;

/// Run the server on the configured transport until the client leaves or
/// `shutdown_signal` resolves
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    info!("Initializing docker-mcp...");
    let ctx = Arc::new(AppContext::init(&options)?);

    // Tools that need the daemon report their own errors
    if let Err(e) = ctx.runtime.ping().await {
        warn!("Docker daemon is not reachable: {}", e);
    }

    match options.transport {
        Transport::Stdio => serve_stdio(ctx, shutdown_signal).await,
        Transport::Http => {
            let handle = serve_http(&options.server, ctx, shutdown_signal).await?;
            handle
                .await
                .map_err(|e| ServerError::ServerError(e.to_string()))?
        }
    }?;

    info!("docker-mcp shut down");
    Ok(())
}
