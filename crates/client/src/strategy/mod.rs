//! Strategy executors.
//!
//! Each strategy is a short pipeline whose steps run strictly in order:
//!
//! - **cache-first**: cache, then network (cached on success), then a 503 placeholder
//! - **network-first**: network (cached on success), then cache, then the network error
//! - **network-first with offline fallback**: network, then exact cache match,
//!   then the cached root page, then a synthesized offline page
//!
//! Cache reads that fail count as misses. Cache writes run in the background
//! and never affect the response.

pub mod offline;

use std::sync::Arc;

use serde::Serialize;
use smarttask_core::{Error, InterceptedRequest, PassThroughReason, Response, StrategyDecision};

use crate::fetch::Fetcher;
use crate::generations::GenerationManager;
use crate::pending::PendingWork;

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
    /// Cached root page served for a navigation.
    RootFallback,
    Synthesized,
}

/// A response together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Result of dispatching a fetch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The worker declined; the host performs the request unmodified.
    PassThrough(PassThroughReason),
    Responded { decision: StrategyDecision, served: Served },
}

/// The strategy executors, sharing one generation manager and one network.
#[derive(Clone)]
pub struct Strategies {
    generations: Arc<GenerationManager>,
    network: Arc<dyn Fetcher>,
    pending: PendingWork,
    app_name: String,
}

impl Strategies {
    pub fn new(
        generations: Arc<GenerationManager>, network: Arc<dyn Fetcher>, pending: PendingWork, app_name: &str,
    ) -> Self {
        Self { generations, network, pending, app_name: app_name.to_string() }
    }

    /// Run the strategy the router picked.
    ///
    /// # Errors
    ///
    /// Only network-first fails, with the original network error, when the
    /// network and the cache both come up empty.
    pub async fn execute(&self, decision: StrategyDecision, request: &InterceptedRequest) -> Result<FetchOutcome, Error> {
        let served = match decision {
            StrategyDecision::PassThrough(reason) => return Ok(FetchOutcome::PassThrough(reason)),
            StrategyDecision::CacheFirst => self.cache_first(request).await,
            StrategyDecision::NetworkFirst => self.network_first(request).await?,
            StrategyDecision::NetworkFirstOfflineFallback => self.network_first_with_offline_fallback(request).await,
        };
        Ok(FetchOutcome::Responded { decision, served })
    }

    pub async fn cache_first(&self, request: &InterceptedRequest) -> Served {
        if let Some(cached) = self.lookup(request).await {
            tracing::debug!(url = %request.url, "cache hit");
            return Served::new(cached, ResponseSource::Cache);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response).await;
                Served::new(response, ResponseSource::Network)
            }
            Err(e) => {
                tracing::error!(url = %request.url, error = %e, "cache-first strategy failed");
                Served::new(offline::unavailable(), ResponseSource::Synthesized)
            }
        }
    }

    pub async fn network_first(&self, request: &InterceptedRequest) -> Result<Served, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response).await;
                Ok(Served::new(response, ResponseSource::Network))
            }
            Err(e) if !e.is_network_failure() => Err(e),
            Err(network_error) => {
                tracing::info!(url = %request.url, error = %network_error, "network failed, trying cache");
                match self.lookup(request).await {
                    Some(cached) => Ok(Served::new(cached, ResponseSource::Cache)),
                    None => Err(network_error),
                }
            }
        }
    }

    pub async fn network_first_with_offline_fallback(&self, request: &InterceptedRequest) -> Served {
        let network_error = match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(request, &response).await;
                return Served::new(response, ResponseSource::Network);
            }
            Err(e) => e,
        };
        tracing::info!(url = %request.url, error = %network_error, "network failed for navigation, trying cache");

        if let Some(cached) = self.lookup(request).await {
            return Served::new(cached, ResponseSource::Cache);
        }

        if let Ok(root_url) = request.url.join("/") {
            let root = InterceptedRequest::get(root_url);
            if let Some(cached) = self.lookup(&root).await {
                return Served::new(cached, ResponseSource::RootFallback);
            }
        }

        Served::new(offline::offline_page(&self.app_name), ResponseSource::Synthesized)
    }

    /// Cache lookup where a failing read is a miss.
    async fn lookup(&self, request: &InterceptedRequest) -> Option<Response> {
        match self.generations.match_request(request).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Write a successful response to the dynamic generation without delaying the caller.
    async fn store_in_background(&self, request: &InterceptedRequest, response: &Response) {
        if !response.is_ok() {
            return;
        }
        let generations = self.generations.clone();
        let request = request.clone();
        let response = response.clone();
        self.pending
            .spawn(async move { generations.put_dynamic(&request, &response).await })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakyStore, Outage, StubNetwork};
    use smarttask_core::{CacheDb, CacheStore, GenerationSet};
    use std::sync::atomic::Ordering;

    struct Harness {
        network: Arc<StubNetwork>,
        store: Arc<FlakyStore>,
        pending: PendingWork,
        strategies: Strategies,
    }

    async fn harness() -> Harness {
        let network = Arc::new(StubNetwork::new());
        let store = Arc::new(FlakyStore::new().await);
        let pending = PendingWork::new();
        let generations = Arc::new(GenerationManager::new(store.clone(), GenerationSet::new("smarttask", "1.0.0")));
        let strategies = Strategies::new(generations, network.clone(), pending.clone(), "SmartTask");
        Harness { network, store, pending, strategies }
    }

    fn db(h: &Harness) -> &CacheDb {
        &h.store.inner
    }

    #[tokio::test]
    async fn test_cache_first_populates_then_serves_offline() {
        let h = harness().await;
        h.network.route("http://localhost:3000/styles.css", Response::ok("body{}"));
        let request = h.network.request("/styles.css");

        let first = h.strategies.cache_first(&request).await;
        assert_eq!(first.source, ResponseSource::Network);
        assert_eq!(first.response.text(), "body{}");
        h.pending.settle().await;

        h.network.set_online(false);
        let second = h.strategies.cache_first(&request).await;
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(second.response.text(), "body{}");
    }

    #[tokio::test]
    async fn test_cache_first_fetches_once() {
        let h = harness().await;
        h.network.route("http://localhost:3000/app.js", Response::ok("console.log(1)"));
        let request = h.network.request("/app.js");

        let first = h.strategies.cache_first(&request).await;
        h.pending.settle().await;
        let second = h.strategies.cache_first(&request).await;

        assert_eq!(first.response.body, second.response.body);
        assert_eq!(h.network.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_store_errors() {
        let h = harness().await;
        let request = h.network.request("/missing.png");

        let served = h.strategies.cache_first(&request).await;
        h.pending.settle().await;

        assert_eq!(served.response.status, 404);
        assert_eq!(served.source, ResponseSource::Network);
        assert!(db(&h).match_entry(None, &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_first_offline_miss_synthesizes_503() {
        let h = harness().await;
        h.network.set_online(false);

        let served = h.strategies.cache_first(&h.network.request("/styles.css")).await;

        assert_eq!(served.source, ResponseSource::Synthesized);
        assert_eq!(served.response.status, 503);
        assert_eq!(served.response.status_text, "Service Unavailable");
        assert_eq!(served.response.text(), "Offline - Content not available");
    }

    #[tokio::test]
    async fn test_cache_first_aborted_fetch_is_network_failure() {
        let h = harness().await;
        h.network.fail_with(Outage::Aborted);

        let served = h.strategies.cache_first(&h.network.request("/styles.css")).await;
        assert_eq!(served.response.status, 503);
    }

    #[tokio::test]
    async fn test_cache_first_read_failure_is_miss() {
        let h = harness().await;
        h.network.route("http://localhost:3000/app.css", Response::ok("fresh"));
        h.store.fail_reads.store(true, Ordering::SeqCst);

        let served = h.strategies.cache_first(&h.network.request("/app.css")).await;

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.text(), "fresh");
    }

    #[tokio::test]
    async fn test_cache_write_failure_does_not_fail_request() {
        let h = harness().await;
        h.network.route("http://localhost:3000/api/tasks", Response::ok("[]"));
        h.store.fail_writes.store(true, Ordering::SeqCst);

        let served = h.strategies.network_first(&h.network.request("/api/tasks")).await.unwrap();
        assert_eq!(h.pending.settle().await, 1);

        assert_eq!(served.response.text(), "[]");
        assert!(!db(&h).has_cache("smarttask-dynamic-v1.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn test_network_first_prefers_network() {
        let h = harness().await;
        let request = h.network.request("/api/tasks");
        db(&h).put_entry("smarttask-dynamic-v1.0.0", &request, &Response::ok("stale")).await.unwrap();
        h.network.route("http://localhost:3000/api/tasks", Response::ok("fresh"));

        let served = h.strategies.network_first(&request).await.unwrap();
        h.pending.settle().await;

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.text(), "fresh");
        let cached = db(&h).match_entry(None, &request).await.unwrap().unwrap();
        assert_eq!(cached.text(), "fresh");
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache() {
        let h = harness().await;
        let request = h.network.request("/api/tasks");
        db(&h).put_entry("smarttask-dynamic-v1.0.0", &request, &Response::ok("cached")).await.unwrap();
        h.network.set_online(false);

        let served = h.strategies.network_first(&request).await.unwrap();

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "cached");
    }

    #[tokio::test]
    async fn test_network_first_propagates_network_error() {
        let h = harness().await;
        h.network.set_online(false);

        let result = h.strategies.network_first(&h.network.request("/api/sync")).await;

        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_network_first_rejected_request_skips_cache() {
        let h = harness().await;
        let request = h.network.request("/api/tasks");
        db(&h).put_entry("smarttask-dynamic-v1.0.0", &request, &Response::ok("cached")).await.unwrap();
        h.network.fail_with(Outage::Rejected);

        let result = h.strategies.network_first(&request).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_network_first_returns_http_errors_as_is() {
        let h = harness().await;
        let request = h.network.request("/api/tasks");
        db(&h).put_entry("smarttask-dynamic-v1.0.0", &request, &Response::ok("cached")).await.unwrap();
        h.network.route("http://localhost:3000/api/tasks", Response::new(500, "Internal Server Error", "oops"));

        let served = h.strategies.network_first(&request).await.unwrap();
        h.pending.settle().await;

        assert_eq!(served.response.status, 500);
        assert_eq!(db(&h).match_entry(None, &request).await.unwrap().unwrap().text(), "cached");
    }

    #[tokio::test]
    async fn test_navigation_exact_cache_match() {
        let h = harness().await;
        let request = h.network.navigation("/tasks");
        db(&h).put_entry("smarttask-dynamic-v1.0.0", &request, &Response::ok("tasks page")).await.unwrap();
        db(&h).put_entry("smarttask-static-v1.0.0", &h.network.request("/"), &Response::ok("home")).await.unwrap();
        h.network.set_online(false);

        let served = h.strategies.network_first_with_offline_fallback(&request).await;

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.text(), "tasks page");
    }

    #[tokio::test]
    async fn test_navigation_root_fallback() {
        let h = harness().await;
        db(&h).put_entry("smarttask-static-v1.0.0", &h.network.request("/"), &Response::ok("home")).await.unwrap();
        h.network.set_online(false);

        let served = h.strategies.network_first_with_offline_fallback(&h.network.navigation("/tasks/42")).await;

        assert_eq!(served.source, ResponseSource::RootFallback);
        assert_eq!(served.response.text(), "home");
    }

    #[tokio::test]
    async fn test_navigation_synthesized_offline_page() {
        let h = harness().await;
        h.network.set_online(false);

        let served = h.strategies.network_first_with_offline_fallback(&h.network.navigation("/tasks")).await;

        assert_eq!(served.source, ResponseSource::Synthesized);
        assert_eq!(served.response.status, 200);
        assert_eq!(served.response.content_type(), Some("text/html"));
        assert!(served.response.text().contains("You're Offline"));
    }

    #[tokio::test]
    async fn test_navigation_read_failures_still_resolve() {
        let h = harness().await;
        h.network.fail_with(Outage::Aborted);
        h.store.fail_reads.store(true, Ordering::SeqCst);

        let served = h.strategies.network_first_with_offline_fallback(&h.network.navigation("/")).await;

        assert_eq!(served.source, ResponseSource::Synthesized);
        assert!(served.response.text().contains("You're Offline"));
    }

    #[tokio::test]
    async fn test_navigation_success_is_cached() {
        let h = harness().await;
        h.network.route("http://localhost:3000/tasks", Response::ok("live"));
        let request = h.network.navigation("/tasks");

        let served = h.strategies.network_first_with_offline_fallback(&request).await;
        h.pending.settle().await;

        assert_eq!(served.source, ResponseSource::Network);
        assert!(h.store.match_any(&request).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_execute_pass_through() {
        let h = harness().await;
        let outcome = h
            .strategies
            .execute(StrategyDecision::PassThrough(PassThroughReason::NonGetMethod), &h.network.request("/api/tasks"))
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::PassThrough(PassThroughReason::NonGetMethod));
        assert_eq!(h.network.calls(), 0);
    }
}
