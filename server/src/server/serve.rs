//! Transport setup

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use rmcp::ServiceExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::context::AppContext;
use crate::app::options::ServerOptions;
use crate::errors::ServerError;
use crate::server::handlers::{health_handler, version_handler};
use crate::server::tools::DockerTools;

/// Serve one MCP session over stdin/stdout
pub async fn serve_stdio(
    ctx: Arc<AppContext>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    info!("Serving MCP over stdio");
    let service = DockerTools::new(ctx)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal.await;
        info!("Shutdown signal received, shutting down...");
        cancel.cancel();
    });

    let reason = service
        .waiting()
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;
    info!("MCP session ended: {:?}", reason);
    Ok(())
}

/// Start the streamable HTTP server
pub async fn serve_http(
    options: &ServerOptions,
    ctx: Arc<AppContext>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), ServerError>>, ServerError> {
    let factory_ctx = ctx.clone();
    let mcp_service = StreamableHttpService::new(
        move || Ok(DockerTools::new(factory_ctx.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let app = Router::new()
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // MCP
        .nest_service("/mcp", mcp_service)
        // State and middleware
        .with_state(ctx)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServerError(e.to_string()))
    });

    Ok(handle)
}
