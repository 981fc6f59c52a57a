//! sw_set_online tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::respond;
use crate::runtime::Runtime;

/// Parameters for the sw_set_online tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwSetOnlineParams {
    /// Whether the network is reachable.
    pub online: bool,
}

/// Output from the sw_set_online tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwSetOnlineOutput {
    pub online: bool,
}

/// Implementation of the sw_set_online tool.
pub async fn set_online_impl(runtime: &Runtime, params: SwSetOnlineParams) -> Result<CallToolResult, McpError> {
    runtime.network().set_online(params.online);
    respond(&SwSetOnlineOutput { online: runtime.network().is_online() })
}
