//! sw_fetch tool implementation.
//!
//! Dispatches a fetch event to the active worker. Requests the worker passes
//! through are performed by the host itself, as a browser would.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smarttask_client::ResponseSource;
use smarttask_client::fetch::resolve;
use smarttask_core::{Error, InterceptedRequest, RequestMode, Response, StrategyDecision};

use super::respond;
use crate::host::HostEvent;
use crate::runtime::{Dispatched, Runtime};

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "no-cors" (default), "cors" or "same-origin".
    #[serde(default)]
    pub mode: RequestMode,
}

fn default_method() -> String {
    "GET".into()
}

/// Who produced the response the page receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Worker,
    Host,
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    pub method: String,
    #[serde(flatten)]
    pub decision: StrategyDecision,
    pub handled_by: Origin,
    /// Where the worker found the response; absent for pass-through.
    pub source: Option<ResponseSource>,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub events: Vec<HostEvent>,
}

impl SwFetchOutput {
    fn new(
        request: &InterceptedRequest, decision: StrategyDecision, handled_by: Origin, source: Option<ResponseSource>,
        response: Response, events: Vec<HostEvent>,
    ) -> Self {
        Self {
            url: request.url.to_string(),
            method: request.method.clone(),
            decision,
            handled_by,
            source,
            status: response.status,
            body: response.text().into_owned(),
            status_text: response.status_text,
            headers: response.headers,
            events,
        }
    }
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(runtime: &Runtime, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let origin = runtime.config().origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let url = resolve(&origin, &params.url).map_err(Error::from)?;
    let request = InterceptedRequest::new(&params.method, url, params.mode);

    let dispatched = runtime.fetch(&request).await?;
    let events = runtime.host().drain().await;

    let output = match dispatched {
        Dispatched::Worker { decision, served } => {
            SwFetchOutput::new(&request, decision, Origin::Worker, Some(served.source), served.response, events)
        }
        Dispatched::PassedThrough { reason, response } => {
            SwFetchOutput::new(&request, StrategyDecision::PassThrough(reason), Origin::Host, None, response, events)
        }
    };

    tracing::debug!(url = %output.url, strategy = output.decision.name(), status = output.status, "fetch dispatched");
    respond(&output)
}
