//! Test runtime wired to an in-memory store and a routed stub network.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use smarttask_client::Fetcher;
use smarttask_core::{AppConfig, CacheDb, Error, InterceptedRequest, Response};

use crate::runtime::Runtime;

/// Serves fixed responses by absolute URL, 404 otherwise.
#[derive(Default)]
pub struct RoutedNetwork {
    routes: HashMap<String, Response>,
}

impl RoutedNetwork {
    pub fn with(mut self, url: &str, response: Response) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }
}

#[async_trait]
impl Fetcher for RoutedNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        Ok(self
            .routes
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::new(404, "Not Found", "")))
    }
}

pub fn app_network() -> RoutedNetwork {
    RoutedNetwork::default()
        .with("http://localhost:3000/", Response::ok("<html>home</html>").with_header("content-type", "text/html"))
        .with("http://localhost:3000/manifest.json", Response::ok("{}"))
        .with("http://localhost:3000/icon-192x192.png", Response::ok("png192"))
        .with("http://localhost:3000/icon-512x512.png", Response::ok("png512"))
        .with("http://localhost:3000/styles.css", Response::ok("body{}"))
        .with("http://localhost:3000/api/tasks", Response::ok("[]"))
}

pub async fn runtime_with(network: RoutedNetwork) -> Runtime {
    let store = Arc::new(CacheDb::open_in_memory().await.unwrap());
    Runtime::new(AppConfig::default(), store, Arc::new(network))
}

/// A runtime with the default build installed and activated.
pub async fn active_runtime() -> Runtime {
    let runtime = runtime_with(app_network()).await;
    runtime.install(None).await.unwrap();
    runtime.activate().await.unwrap();
    runtime.host().drain().await;
    runtime
}
