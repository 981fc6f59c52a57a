//! Event tools: sw_message, sw_sync, sw_periodic_sync, sw_push and
//! sw_notification_click.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smarttask_client::Notification;

use super::respond;
use crate::host::HostEvent;
use crate::runtime::Runtime;

/// Parameters for the sw_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message payload posted by a page, e.g. `{"type": "SKIP_WAITING"}`.
    pub data: serde_json::Value,
}

/// Parameters for the sw_sync and sw_periodic_sync tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSyncParams {
    /// Sync registration tag.
    pub tag: String,
}

/// Parameters for the sw_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwPushParams {
    /// Push payload text. A default body is used when absent.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Parameters for the sw_notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwNotificationClickParams {
    /// The action button clicked: "view", "dismiss", or none for the body.
    #[serde(default)]
    pub action: Option<String>,
}

/// Output of tools that only report whether the event was recognized.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct HandledOutput {
    pub handled: bool,
    pub events: Vec<HostEvent>,
}

/// Output from the sw_message tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwMessageOutput {
    pub handled: bool,
    /// Generations deleted if the message activated the waiting version.
    pub deleted: Option<Vec<String>>,
    pub events: Vec<HostEvent>,
}

/// Output from the sw_push tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwPushOutput {
    pub notification: Notification,
    pub events: Vec<HostEvent>,
}

/// Implementation of the sw_message tool.
pub async fn message_impl(runtime: &Runtime, params: SwMessageParams) -> Result<CallToolResult, McpError> {
    let report = runtime.message(&params.data).await?;
    let output = SwMessageOutput {
        handled: report.message.is_some(),
        deleted: report.deleted,
        events: runtime.host().drain().await,
    };
    respond(&output)
}

/// Implementation of the sw_sync tool.
pub async fn sync_impl(runtime: &Runtime, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let handled = runtime.sync(&params.tag).await?;
    respond(&HandledOutput { handled, events: runtime.host().drain().await })
}

/// Implementation of the sw_periodic_sync tool.
pub async fn periodic_sync_impl(runtime: &Runtime, params: SwSyncParams) -> Result<CallToolResult, McpError> {
    let handled = runtime.periodic_sync(&params.tag).await?;
    respond(&HandledOutput { handled, events: runtime.host().drain().await })
}

/// Implementation of the sw_push tool.
pub async fn push_impl(runtime: &Runtime, params: SwPushParams) -> Result<CallToolResult, McpError> {
    let notification = runtime.push(params.payload.as_deref()).await?;
    respond(&SwPushOutput { notification, events: runtime.host().drain().await })
}

/// Implementation of the sw_notification_click tool.
pub async fn notification_click_impl(
    runtime: &Runtime, params: SwNotificationClickParams,
) -> Result<CallToolResult, McpError> {
    runtime.notification_click(params.action.as_deref()).await?;
    respond(&HandledOutput { handled: true, events: runtime.host().drain().await })
}
