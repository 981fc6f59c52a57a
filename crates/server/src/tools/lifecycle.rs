//! sw_install and sw_activate tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smarttask_client::WorkerState;

use super::respond;
use crate::host::HostEvent;
use crate::runtime::Runtime;

/// Parameters for the sw_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwInstallParams {
    /// Build version to install. Defaults to the configured version.
    #[serde(default)]
    pub cache_version: Option<String>,

    /// Activate right away when the worker asks to skip waiting (default: true).
    #[serde(default = "default_true")]
    pub auto_activate: bool,
}

fn default_true() -> bool {
    true
}

/// Output from the sw_install tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwInstallOutput {
    pub cache_version: String,
    /// Number of precached assets.
    pub assets: usize,
    pub state: WorkerState,
    /// Generations deleted by the activation, if the worker was activated.
    pub deleted: Option<Vec<String>>,
    pub events: Vec<HostEvent>,
}

/// Output from the sw_activate tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwActivateOutput {
    pub deleted: Vec<String>,
    pub state: WorkerState,
    pub events: Vec<HostEvent>,
}

/// Implementation of the sw_install tool.
pub async fn install_impl(runtime: &Runtime, params: SwInstallParams) -> Result<CallToolResult, McpError> {
    let report = runtime.install(params.cache_version).await?;

    let (state, deleted) = if params.auto_activate && report.skip_waiting {
        let deleted = runtime.activate().await?;
        (WorkerState::Activated, Some(deleted))
    } else {
        (WorkerState::Installed, None)
    };

    let output = SwInstallOutput {
        cache_version: report.cache_version,
        assets: report.assets,
        state,
        deleted,
        events: runtime.host().drain().await,
    };
    respond(&output)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(runtime: &Runtime) -> Result<CallToolResult, McpError> {
    let deleted = runtime.activate().await?;
    let output = SwActivateOutput { deleted, state: WorkerState::Activated, events: runtime.host().drain().await };
    respond(&output)
}
