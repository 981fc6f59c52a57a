//! cache_list tool implementation.
//!
//! Lists every cache generation in storage with its entry count.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use super::respond;
use crate::runtime::Runtime;

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheSummary {
    pub name: String,
    pub entries: u64,
    /// Whether the name belongs to the active build, or the configured one before any activation.
    pub current: bool,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CacheListOutput {
    pub caches: Vec<CacheSummary>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(runtime: &Runtime) -> Result<CallToolResult, McpError> {
    let current = match runtime.active().await {
        Ok(worker) => worker.generations().names().clone(),
        Err(_) => runtime.config().generations(),
    };
    let mut caches = Vec::new();
    for name in runtime.store().cache_names().await? {
        let entries = runtime.store().entry_count(&name).await?;
        caches.push(CacheSummary { current: current.contains(&name), name, entries });
    }
    respond(&CacheListOutput { caches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{active_runtime, app_network, runtime_with};
    use crate::tools::output_json;
    use smarttask_core::InterceptedRequest;

    #[tokio::test]
    async fn test_list_empty() {
        let runtime = runtime_with(app_network()).await;
        let json = output_json(&list_impl(&runtime).await.unwrap());
        assert_eq!(json["caches"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_list_generations() {
        let runtime = active_runtime().await;
        let stale = InterceptedRequest::parse("GET", "http://localhost:3000/old.js", Default::default()).unwrap();
        runtime
            .store()
            .put_entry("smarttask-v0.9.0", &stale, &smarttask_core::Response::ok("old"))
            .await
            .unwrap();

        let json = output_json(&list_impl(&runtime).await.unwrap());

        assert_eq!(json["caches"][0]["name"], "smarttask-static-v1.0.0");
        assert_eq!(json["caches"][0]["entries"], 4);
        assert_eq!(json["caches"][0]["current"], true);
        assert_eq!(json["caches"][1]["name"], "smarttask-v0.9.0");
        assert_eq!(json["caches"][1]["current"], false);
    }

    #[tokio::test]
    async fn test_list_marks_active_version_as_current() {
        let runtime = active_runtime().await;
        runtime.install(Some("2.0.0".into())).await.unwrap();
        runtime.activate().await.unwrap();

        let json = output_json(&list_impl(&runtime).await.unwrap());

        assert_eq!(json["caches"][0]["name"], "smarttask-static-v2.0.0");
        assert_eq!(json["caches"][0]["entries"], 4);
        assert_eq!(json["caches"][0]["current"], true);
        assert_eq!(json["caches"].as_array().unwrap().len(), 1);
    }
}
