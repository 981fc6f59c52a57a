//! Switchable connectivity in front of a fetcher.
//!
//! While offline, every fetch fails the same way a dropped connection would,
//! so the strategies take their failure paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use smarttask_core::{Error, InterceptedRequest, Response};

use super::Fetcher;

/// A fetcher that can be taken offline.
pub struct Connectivity {
    inner: Arc<dyn Fetcher>,
    online: AtomicBool,
}

impl Connectivity {
    /// Wrap a fetcher; starts online.
    pub fn new(inner: Arc<dyn Fetcher>) -> Self {
        Self { inner, online: AtomicBool::new(true) }
    }

    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            tracing::info!(online, "connectivity changed");
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for Connectivity {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        if !self.is_online() {
            return Err(Error::Network(format!("offline: {} unreachable", request.url)));
        }
        self.inner.fetch(request).await
    }
}
