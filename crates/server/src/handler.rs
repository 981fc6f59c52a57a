//! MCP server handler implementation.
//!
//! This module defines the server handler that routes tool calls to the
//! host runtime. Each tool is one host event.
use std::sync::Arc;

use crate::runtime::Runtime;
use crate::tools::{
    SwFetchParams, SwInstallParams, SwMessageParams, SwNotificationClickParams, SwPushParams, SwSetOnlineParams,
    SwSyncParams, cache, events, fetch, lifecycle, network,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler hosting the SmartTask worker.
#[derive(Clone)]
pub struct SwServer {
    runtime: Arc<Runtime>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl SwServer {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install a worker version: precache the static assets. Activates it right away when it asks to skip waiting, unless auto_activate is false.")]
    async fn sw_install(&self, params: Parameters<SwInstallParams>) -> Result<CallToolResult, McpError> {
        lifecycle::install_impl(&self.runtime, params.0).await
    }

    #[tool(description = "Activate the waiting worker version: delete stale cache generations and claim open pages.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        lifecycle::activate_impl(&self.runtime).await
    }

    #[tool(description = "Dispatch a fetch event to the active worker. Returns the response the page would receive, its strategy and source.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch::fetch_impl(&self.runtime, params.0).await
    }

    #[tool(description = "Post a message from a page to the worker, e.g. {\"type\": \"SKIP_WAITING\"}.")]
    async fn sw_message(&self, params: Parameters<SwMessageParams>) -> Result<CallToolResult, McpError> {
        events::message_impl(&self.runtime, params.0).await
    }

    #[tool(description = "Fire a background sync event. The task-sync tag replays offline task changes.")]
    async fn sw_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        events::sync_impl(&self.runtime, params.0).await
    }

    #[tool(description = "Fire a periodic sync event. The task-reminders tag checks for due tasks.")]
    async fn sw_periodic_sync(&self, params: Parameters<SwSyncParams>) -> Result<CallToolResult, McpError> {
        events::periodic_sync_impl(&self.runtime, params.0).await
    }

    #[tool(description = "Deliver a push message. Shows a notification with the payload as its body.")]
    async fn sw_push(&self, params: Parameters<SwPushParams>) -> Result<CallToolResult, McpError> {
        events::push_impl(&self.runtime, params.0).await
    }

    #[tool(description = "Click the worker's notification, optionally on an action button (view or dismiss).")]
    async fn sw_notification_click(
        &self, params: Parameters<SwNotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        events::notification_click_impl(&self.runtime, params.0).await
    }

    #[tool(description = "Take the network offline or bring it back online.")]
    async fn sw_set_online(&self, params: Parameters<SwSetOnlineParams>) -> Result<CallToolResult, McpError> {
        network::set_online_impl(&self.runtime, params.0).await
    }

    #[tool(description = "List cache generations in storage with their entry counts.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        cache::list_impl(&self.runtime).await
    }
}

impl ServerHandler for SwServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "smarttask-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
