//! Cache generation manager.
//!
//! Owns the three current generations of a build: primes the static one at
//! install, purges every other generation at activation, and gives the
//! strategies best-effort writes and unscoped lookups.

use std::sync::Arc;

use futures_util::future::{join_all, try_join_all};
use smarttask_core::{CacheStore, Error, GenerationSet, InterceptedRequest, Response};

use crate::fetch::Fetcher;

pub struct GenerationManager {
    store: Arc<dyn CacheStore>,
    names: GenerationSet,
}

impl GenerationManager {
    pub fn new(store: Arc<dyn CacheStore>, names: GenerationSet) -> Self {
        Self { store, names }
    }

    pub fn names(&self) -> &GenerationSet {
        &self.names
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Fetch every asset and store them in the static generation.
    ///
    /// All-or-nothing: the assets are fetched first and written in a single
    /// batch, so a failed or non-ok fetch leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` naming the first asset that failed, or
    /// the storage failure.
    pub async fn ensure_static_primed(&self, network: &dyn Fetcher, assets: &[InterceptedRequest]) -> Result<usize, Error> {
        let fetches = assets.iter().map(|request| async move {
            let response = network
                .fetch(request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", request.url)))?;
            if !response.is_ok() {
                return Err(Error::InstallFailed(format!("{} returned {}", request.url, response.status)));
            }
            Ok((request.clone(), response))
        });
        let entries = try_join_all(fetches).await?;

        let name = self.names.static_gen.name();
        self.store
            .put_all(&name, &entries)
            .await
            .map_err(|e| Error::InstallFailed(format!("could not store static assets: {e}")))?;

        tracing::info!(cache = %name, assets = entries.len(), "static assets cached");
        Ok(entries.len())
    }

    /// Delete every generation that does not belong to the current build.
    ///
    /// Deletions run concurrently and are all awaited before returning.
    /// Returns the deleted names.
    pub async fn reconcile(&self) -> Result<Vec<String>, Error> {
        let existing = self.store.keys().await?;
        let stale: Vec<String> = self.names.stale(&existing).into_iter().map(String::from).collect();

        let deletions = stale.iter().map(|name| async move {
            tracing::info!(cache = %name, "deleting old cache");
            self.store.delete(name).await
        });
        let results = join_all(deletions).await;

        if let Some(err) = results.into_iter().find_map(Result::err) {
            return Err(err);
        }
        Ok(stale)
    }

    /// Store a response; failures are logged and swallowed.
    pub async fn put(&self, generation: &str, request: &InterceptedRequest, response: &Response) {
        match self.store.put(generation, request, response).await {
            Ok(()) => tracing::debug!(cache = generation, url = %request.url, "cached response"),
            Err(e) => tracing::warn!(cache = generation, url = %request.url, error = %e, "cache write failed"),
        }
    }

    /// Store a response in the dynamic generation.
    pub async fn put_dynamic(&self, request: &InterceptedRequest, response: &Response) {
        let name = self.names.dynamic_gen.name();
        self.put(&name, request, response).await;
    }

    /// Look a request up across every generation.
    pub async fn match_request(&self, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        self.store.match_any(request).await
    }
}
