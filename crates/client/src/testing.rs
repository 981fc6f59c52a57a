//! Test doubles for the network, the host and the cache store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use smarttask_core::{CacheDb, CacheStore, Error, InterceptedRequest, Response};
use url::Url;

use crate::fetch::Fetcher;
use crate::worker::{ClientMessage, Clients, Notification};

pub const ORIGIN: &str = "http://localhost:3000";

/// How the stub network fails while `online` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outage {
    Down,
    Aborted,
    /// The request itself is unusable, e.g. an unknown method.
    Rejected,
}

/// In-memory network: routes by absolute URL, 404 for anything unrouted.
pub struct StubNetwork {
    routes: Mutex<HashMap<String, Response>>,
    online: AtomicBool,
    outage: Mutex<Outage>,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            outage: Mutex::new(Outage::Down),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn route(&self, url: &str, response: Response) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn fail_with(&self, outage: Outage) {
        *self.outage.lock().unwrap() = outage;
        self.set_online(false);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn request(&self, path: &str) -> InterceptedRequest {
        InterceptedRequest::get(Url::parse(ORIGIN).unwrap().join(path).unwrap())
    }

    pub fn navigation(&self, path: &str) -> InterceptedRequest {
        InterceptedRequest::navigate(Url::parse(ORIGIN).unwrap().join(path).unwrap())
    }
}

#[async_trait]
impl Fetcher for StubNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.online.load(Ordering::SeqCst) {
            return match *self.outage.lock().unwrap() {
                Outage::Down => Err(Error::Network(format!("{} unreachable", request.url))),
                Outage::Aborted => Err(Error::FetchAborted(format!("{} aborted", request.url))),
                Outage::Rejected => Err(Error::InvalidInput(format!("{} rejected", request.method))),
            };
        }
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::new(404, "Not Found", "")))
    }
}

/// A host call observed by [`RecordingClients`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SkipWaiting,
    Claim,
    Message(ClientMessage),
    Notify(Notification),
    CloseNotification,
    OpenWindow(String),
}

#[derive(Default)]
pub struct RecordingClients {
    pub calls: Mutex<Vec<HostCall>>,
}

impl RecordingClients {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Clients for RecordingClients {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.record(HostCall::SkipWaiting);
        Ok(())
    }

    async fn claim(&self) -> Result<(), Error> {
        self.record(HostCall::Claim);
        Ok(())
    }

    async fn post_message(&self, message: ClientMessage) -> Result<(), Error> {
        self.record(HostCall::Message(message));
        Ok(())
    }

    async fn show_notification(&self, notification: Notification) -> Result<(), Error> {
        self.record(HostCall::Notify(notification));
        Ok(())
    }

    async fn close_notification(&self) -> Result<(), Error> {
        self.record(HostCall::CloseNotification);
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(HostCall::OpenWindow(url.to_string()));
        Ok(())
    }
}

/// SQLite store whose reads and/or writes can be made to fail.
pub struct FlakyStore {
    pub inner: CacheDb,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    pub async fn new() -> Self {
        Self {
            inner: CacheDb::open_in_memory().await.unwrap(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn check(flag: &AtomicBool) -> Result<(), Error> {
        if flag.load(Ordering::SeqCst) { Err(Error::CorruptEntry("injected failure".into())) } else { Ok(()) }
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn open(&self, name: &str) -> Result<(), Error> {
        Self::check(&self.fail_writes)?;
        self.inner.open(name).await
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        Self::check(&self.fail_reads)?;
        self.inner.has(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Self::check(&self.fail_reads)?;
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        Self::check(&self.fail_writes)?;
        self.inner.delete(name).await
    }

    async fn put(&self, name: &str, request: &InterceptedRequest, response: &Response) -> Result<(), Error> {
        Self::check(&self.fail_writes)?;
        self.inner.put(name, request, response).await
    }

    async fn put_all(&self, name: &str, entries: &[(InterceptedRequest, Response)]) -> Result<(), Error> {
        Self::check(&self.fail_writes)?;
        self.inner.put_all(name, entries).await
    }

    async fn match_in(&self, name: &str, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        Self::check(&self.fail_reads)?;
        self.inner.match_in(name, request).await
    }

    async fn match_any(&self, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        Self::check(&self.fail_reads)?;
        self.inner.match_any(request).await
    }

    async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        Self::check(&self.fail_reads)?;
        CacheStore::entry_count(&self.inner, name).await
    }
}
