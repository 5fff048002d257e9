//! MCP tool implementations.
//!
//! Exposes four tools via the `rmcp` `#[tool]` macro:
//!   - `create-container`
//!   - `deploy-compose`
//!   - `get-logs`
//!   - `list-containers`
//!
//! Every tool answers with a text report. Failure reports are returned as
//! tool error content so clients can tell them apart.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use crate::app::context::AppContext;
use crate::models::container::ContainerRequest;
use crate::models::report::ToolReport;
use crate::runtime::inspect;

/// Input parameters for the `deploy-compose` tool.
///
/// Fields are advertised as required, but a missing or `null` value still
/// reaches the deployer so it can answer with a precondition report.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DeployComposeInput {
    /// Docker Compose YAML configuration
    #[schemars(required)]
    pub compose_yaml: Option<String>,

    /// Name for the compose project
    #[schemars(required)]
    pub project_name: Option<String>,
}

/// Input parameters for the `get-logs` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetLogsInput {
    /// Name of the container
    #[schemars(required)]
    pub container_name: Option<String>,
}

/// MCP server handler exposing the container tools.
#[derive(Clone)]
pub struct DockerTools {
    ctx: Arc<AppContext>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DockerTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerTools")
            .field("ctx", &"<AppContext>")
            .finish()
    }
}

impl DockerTools {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl DockerTools {
    #[tool(
        name = "create-container",
        description = "Create a new standalone Docker container"
    )]
    async fn create_container(
        &self,
        params: Parameters<ContainerRequest>,
    ) -> Result<String, String> {
        let request = params.0;
        info!("create-container image={}", request.image_ref());
        self.ctx.launcher.create(&request).await.into_result()
    }

    #[tool(
        name = "deploy-compose",
        description = "Deploy a Docker Compose stack"
    )]
    async fn deploy_compose(
        &self,
        params: Parameters<DeployComposeInput>,
    ) -> Result<String, String> {
        let input = params.0;
        let compose_yaml = input.compose_yaml.as_deref().unwrap_or_default();
        let project_name = input.project_name.as_deref().unwrap_or_default();
        info!("deploy-compose project={}", project_name);
        self.ctx
            .deployer
            .deploy(compose_yaml, project_name)
            .await
            .into_result()
    }

    #[tool(
        name = "get-logs",
        description = "Retrieve the latest logs for a specified Docker container"
    )]
    async fn get_logs(&self, params: Parameters<GetLogsInput>) -> Result<String, String> {
        let input = params.0;
        let container_name = input.container_name.as_deref().unwrap_or_default();
        inspect::get_logs(self.ctx.runtime.as_ref(), container_name)
            .await
            .into_result()
    }

    #[tool(
        name = "list-containers",
        description = "List all Docker containers"
    )]
    async fn list_containers(&self) -> Result<String, String> {
        inspect::list_containers(self.ctx.runtime.as_ref())
            .await
            .into_result()
    }
}

#[tool_handler]
impl ServerHandler for DockerTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Deploy and inspect containers on the host Docker runtime. \
                 Use deploy-compose for multi-service stacks and create-container \
                 for a single image."
                    .into(),
            ),
            ..Default::default()
        }
    }
}
