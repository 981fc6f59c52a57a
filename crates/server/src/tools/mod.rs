//! MCP tool implementations.
//!
//! Each tool dispatches one host event to the runtime and reports the
//! result together with the host effects the worker produced.

pub mod cache;
pub mod events;
pub mod fetch;
pub mod lifecycle;
pub mod network;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use smarttask_core::Error;

pub use events::{SwMessageParams, SwNotificationClickParams, SwPushParams, SwSyncParams};
pub use fetch::SwFetchParams;
pub use lifecycle::SwInstallParams;
pub use network::SwSetOnlineParams;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn respond<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
