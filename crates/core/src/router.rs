//! Request routing: pick exactly one caching strategy per intercepted request.
//!
//! Classification is pure and synchronous. Precedence, first match wins:
//!
//! 1. non-`GET` method: pass through
//! 2. non-http(s) scheme: pass through
//! 3. path under the API prefix: network-first
//! 4. static asset (allow-listed extension, build static directory, manifest): cache-first
//! 5. navigation: network-first with offline fallback
//! 6. anything else: cache-first

use serde::Serialize;

use crate::http::InterceptedRequest;

/// File extensions served cache-first.
pub const STATIC_EXTENSIONS: &[&str] = &["js", "css", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2"];

/// Why a request is left to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PassThroughReason {
    NonGetMethod,
    NonHttpScheme,
}

/// Result of classifying one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(tag = "strategy", content = "reason", rename_all = "snake_case")]
pub enum StrategyDecision {
    /// Not intercepted; the host performs the request itself.
    PassThrough(PassThroughReason),
    CacheFirst,
    NetworkFirst,
    /// Network-first, then exact cache match, then cached root page, then a synthesized page.
    NetworkFirstOfflineFallback,
}

impl StrategyDecision {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyDecision::PassThrough(_) => "pass_through",
            StrategyDecision::CacheFirst => "cache_first",
            StrategyDecision::NetworkFirst => "network_first",
            StrategyDecision::NetworkFirstOfflineFallback => "network_first_offline_fallback",
        }
    }

    pub fn is_intercepted(&self) -> bool {
        !matches!(self, StrategyDecision::PassThrough(_))
    }
}

/// Path rules used for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    api_prefix: String,
    static_dir: String,
    manifest_path: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/api/", "/_next/static/", "/manifest.json")
    }
}

impl Router {
    pub fn new(api_prefix: &str, static_dir: &str, manifest_path: &str) -> Self {
        Self {
            api_prefix: api_prefix.to_string(),
            static_dir: static_dir.to_string(),
            manifest_path: manifest_path.to_string(),
        }
    }

    /// Classify a request.
    pub fn classify(&self, request: &InterceptedRequest) -> StrategyDecision {
        let decision = if !request.is_get() {
            StrategyDecision::PassThrough(PassThroughReason::NonGetMethod)
        } else if !request.is_http() {
            StrategyDecision::PassThrough(PassThroughReason::NonHttpScheme)
        } else if request.path().starts_with(&self.api_prefix) {
            StrategyDecision::NetworkFirst
        } else if self.is_static_asset(request.path()) {
            StrategyDecision::CacheFirst
        } else if request.is_navigation() {
            StrategyDecision::NetworkFirstOfflineFallback
        } else {
            StrategyDecision::CacheFirst
        };

        tracing::debug!(url = %request.url, mode = %request.mode, strategy = decision.name(), "classified request");
        decision
    }

    /// Static asset predicate on a URL path.
    pub fn is_static_asset(&self, path: &str) -> bool {
        let has_static_extension = path
            .rsplit_once('.')
            .is_some_and(|(_, ext)| STATIC_EXTENSIONS.contains(&ext));

        has_static_extension || path.contains(&self.static_dir) || path == self.manifest_path
    }
}
