//! The host runtime: owns the cache store, the network and the worker
//! versions, and dispatches events to the right one.
//!
//! A newly installed version waits until it is activated; activation makes it
//! the version that receives fetch, sync and push events. Every dispatch
//! awaits the worker's pending background work before returning.

use std::sync::Arc;

use smarttask_client::{
    Connectivity, FetchOutcome, Fetcher, Notification, Served, ServiceWorker, WorkerMessage,
};
use smarttask_core::{AppConfig, CacheDb, Error, InterceptedRequest, PassThroughReason, Response, StrategyDecision};
use tokio::sync::{Mutex, RwLock};

use crate::host::HostLog;

/// Result of installing a worker version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_version: String,
    pub assets: usize,
    pub skip_waiting: bool,
}

/// Result of posting a page message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReport {
    pub message: Option<WorkerMessage>,
    /// Generations deleted when a skip-waiting message promoted the waiting version.
    pub deleted: Option<Vec<String>>,
}

/// A fetch as seen by the page: the worker's answer, or the host's own
/// network response when the worker passed the request through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Worker { decision: StrategyDecision, served: Served },
    PassedThrough { reason: PassThroughReason, response: Response },
}

pub struct Runtime {
    config: AppConfig,
    store: Arc<CacheDb>,
    network: Arc<Connectivity>,
    host: Arc<HostLog>,
    waiting: Mutex<Option<Arc<ServiceWorker>>>,
    active: RwLock<Option<Arc<ServiceWorker>>>,
}

impl Runtime {
    pub fn new(config: AppConfig, store: Arc<CacheDb>, network: Arc<dyn Fetcher>) -> Self {
        Self {
            config,
            store,
            network: Arc::new(Connectivity::new(network)),
            host: Arc::new(HostLog::new()),
            waiting: Mutex::new(None),
            active: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheDb {
        &self.store
    }

    pub fn host(&self) -> &HostLog {
        &self.host
    }

    pub fn network(&self) -> &Connectivity {
        &self.network
    }

    /// Install a new worker version, optionally overriding the build version.
    ///
    /// The installed version waits until [`Runtime::activate`] is called.
    pub async fn install(&self, cache_version: Option<String>) -> Result<InstallReport, Error> {
        let mut config = self.config.clone();
        if let Some(version) = cache_version {
            if version.trim().is_empty() {
                return Err(Error::InvalidInput("cache_version cannot be empty".into()));
            }
            config.cache_version = version;
        }

        let worker = Arc::new(ServiceWorker::new(&config, self.store.clone(), self.network.clone(), self.host.clone())?);

        let assets = worker.install().await?;
        let skip_waiting = worker.skip_waiting_requested().await;
        *self.waiting.lock().await = Some(worker);

        tracing::info!(version = %config.cache_version, assets, "worker installed");
        Ok(InstallReport { cache_version: config.cache_version, assets, skip_waiting })
    }

    /// Activate the waiting version and route events to it.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        let mut waiting = self.waiting.lock().await;
        let worker = waiting
            .clone()
            .ok_or_else(|| Error::InvalidState("no installed worker is waiting to activate".into()))?;

        let deleted = worker.activate().await?;
        waiting.take();
        *self.active.write().await = Some(worker);
        Ok(deleted)
    }

    /// The version that receives events.
    pub async fn active(&self) -> Result<Arc<ServiceWorker>, Error> {
        self.active
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::InvalidState("no worker is active".into()))
    }

    /// Dispatch a fetch event, performing pass-through requests directly.
    pub async fn fetch(&self, request: &InterceptedRequest) -> Result<Dispatched, Error> {
        let worker = self.active().await?;
        let outcome = worker.handle_fetch(request).await;
        worker.settle().await;

        match outcome? {
            FetchOutcome::PassThrough(reason) => {
                let response = self.network.fetch(request).await?;
                Ok(Dispatched::PassedThrough { reason, response })
            }
            FetchOutcome::Responded { decision, served } => Ok(Dispatched::Worker { decision, served }),
        }
    }

    /// Post a message from a page. The waiting version receives it if there is one,
    /// and `SKIP_WAITING` activates it immediately.
    pub async fn message(&self, data: &serde_json::Value) -> Result<MessageReport, Error> {
        let waiting = self.waiting.lock().await.clone();
        let Some(worker) = waiting else {
            let worker = self.active().await?;
            let message = worker.handle_message(data).await;
            worker.settle().await;
            return Ok(MessageReport { message, deleted: None });
        };

        let message = worker.handle_message(data).await;
        worker.settle().await;

        let deleted = if message == Some(WorkerMessage::SkipWaiting) && worker.skip_waiting_requested().await {
            tracing::info!("skip waiting requested, activating waiting worker");
            Some(self.activate().await?)
        } else {
            None
        };
        Ok(MessageReport { message, deleted })
    }

    pub async fn sync(&self, tag: &str) -> Result<bool, Error> {
        let worker = self.active().await?;
        let handled = worker.handle_sync(tag).await;
        worker.settle().await;
        Ok(handled)
    }

    pub async fn periodic_sync(&self, tag: &str) -> Result<bool, Error> {
        let worker = self.active().await?;
        let handled = worker.handle_periodic_sync(tag).await;
        worker.settle().await;
        Ok(handled)
    }

    pub async fn push(&self, payload: Option<&str>) -> Result<Notification, Error> {
        let worker = self.active().await?;
        let notification = worker.handle_push(payload).await;
        worker.settle().await;
        notification
    }

    pub async fn notification_click(&self, action: Option<&str>) -> Result<(), Error> {
        let worker = self.active().await?;
        let result = worker.handle_notification_click(action).await;
        worker.settle().await;
        result
    }
}
