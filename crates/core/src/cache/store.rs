//! The cache store seam consumed by the worker.
//!
//! Anything that can keep named generations of request/response entries can
//! back the worker; [`CacheDb`] is the SQLite implementation.

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::Error;
use crate::http::{InterceptedRequest, Response};

/// Named-generation cache storage.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the generation if it doesn't exist.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Whether the generation exists.
    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// Every generation name, in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a generation; false if it didn't exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Store one entry, creating the generation on first write.
    async fn put(&self, name: &str, request: &InterceptedRequest, response: &Response) -> Result<(), Error>;

    /// Store all entries atomically.
    async fn put_all(&self, name: &str, entries: &[(InterceptedRequest, Response)]) -> Result<(), Error>;

    /// Look up a request inside one generation.
    async fn match_in(&self, name: &str, request: &InterceptedRequest) -> Result<Option<Response>, Error>;

    /// Look up a request across all generations, first hit wins.
    async fn match_any(&self, request: &InterceptedRequest) -> Result<Option<Response>, Error>;

    /// Number of entries in a generation.
    async fn entry_count(&self, name: &str) -> Result<u64, Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_cache(name).await
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.has_cache(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.cache_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_cache(name).await
    }

    async fn put(&self, name: &str, request: &InterceptedRequest, response: &Response) -> Result<(), Error> {
        self.put_entry(name, request, response).await
    }

    async fn put_all(&self, name: &str, entries: &[(InterceptedRequest, Response)]) -> Result<(), Error> {
        self.put_entries(name, entries).await
    }

    async fn match_in(&self, name: &str, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        self.match_entry(Some(name), request).await
    }

    async fn match_any(&self, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        self.match_entry(None, request).await
    }

    async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        CacheDb::entry_count(self, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cache_db_as_trait_object() {
        let store: Arc<dyn CacheStore> = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let request = InterceptedRequest::get(url::Url::parse("http://localhost:3000/app.js").unwrap());

        store.open("smarttask-static-v1.0.0").await.unwrap();
        store.put("smarttask-dynamic-v1.0.0", &request, &Response::ok("js")).await.unwrap();

        assert_eq!(
            store.keys().await.unwrap(),
            vec!["smarttask-static-v1.0.0", "smarttask-dynamic-v1.0.0"]
        );
        assert!(store.match_in("smarttask-static-v1.0.0", &request).await.unwrap().is_none());
        assert!(store.match_any(&request).await.unwrap().is_some());
        assert_eq!(store.entry_count("smarttask-dynamic-v1.0.0").await.unwrap(), 1);
        assert!(store.delete("smarttask-static-v1.0.0").await.unwrap());
        assert!(!store.has("smarttask-static-v1.0.0").await.unwrap());
    }
}
