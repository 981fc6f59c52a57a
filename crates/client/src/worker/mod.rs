//! The worker object a host runtime dispatches its events to.
//!
//! Constructed once per worker lifetime. Each handler runs to completion
//! before returning; background cache writes started by `handle_fetch` are
//! registered in [`PendingWork`] and the host awaits [`ServiceWorker::settle`]
//! before it may stop the worker.
//!
//! ### Lifecycle
//! - `install`: prime the static generation, then ask to skip the waiting phase
//! - `activate`: purge stale generations, then claim every open page
//! - a failed install leaves the worker `redundant`; the previous version stays in control

pub mod clients;
pub mod hooks;
pub mod messages;

pub use clients::{ClientMessage, Clients, Notification, NotificationAction};
pub use hooks::{BackgroundHooks, LoggingHooks};
pub use messages::WorkerMessage;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use smarttask_core::{AppConfig, CacheStore, Error, InterceptedRequest, Router, StrategyDecision};
use tokio::sync::RwLock;
use url::Url;

use crate::fetch::{Fetcher, resolve};
use crate::generations::GenerationManager;
use crate::pending::PendingWork;
use crate::strategy::{FetchOutcome, Strategies};

/// Background sync tag that replays offline task mutations.
pub const TASK_SYNC_TAG: &str = "task-sync";

/// Periodic sync tag for overdue-task checks.
pub const TASK_REMINDERS_TAG: &str = "task-reminders";

pub const DEFAULT_PUSH_BODY: &str = "You have pending tasks!";

pub const SYNC_COMPLETE_MESSAGE: &str = "Tasks synced successfully";

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this version will never control pages.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: WorkerState,
    skip_waiting: bool,
}

pub struct ServiceWorker {
    router: Router,
    generations: Arc<GenerationManager>,
    strategies: Strategies,
    network: Arc<dyn Fetcher>,
    clients: Arc<dyn Clients>,
    hooks: Arc<dyn BackgroundHooks>,
    pending: PendingWork,
    precache: Vec<InterceptedRequest>,
    origin: Url,
    app_name: String,
    lifecycle: RwLock<Lifecycle>,
}

impl ServiceWorker {
    /// Build a worker for the build described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the origin or a precache path cannot be resolved.
    pub fn new(
        config: &AppConfig, store: Arc<dyn CacheStore>, network: Arc<dyn Fetcher>, clients: Arc<dyn Clients>,
    ) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let precache = config
            .precache_assets
            .iter()
            .map(|path| resolve(&origin, path).map(InterceptedRequest::get))
            .collect::<Result<Vec<_>, _>>()?;

        let pending = PendingWork::new();
        let generations = Arc::new(GenerationManager::new(store, config.generations()));
        let strategies = Strategies::new(generations.clone(), network.clone(), pending.clone(), &config.app_name);

        Ok(Self {
            router: config.router(),
            generations,
            strategies,
            network,
            clients,
            hooks: Arc::new(LoggingHooks),
            pending,
            precache,
            origin,
            app_name: config.app_name.clone(),
            lifecycle: RwLock::new(Lifecycle { state: WorkerState::Parsed, skip_waiting: false }),
        })
    }

    /// Replace the background sync hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn BackgroundHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub async fn state(&self) -> WorkerState {
        self.lifecycle.read().await.state
    }

    /// Whether this version asked to skip the waiting phase.
    pub async fn skip_waiting_requested(&self) -> bool {
        self.lifecycle.read().await.skip_waiting
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn generations(&self) -> &GenerationManager {
        &self.generations
    }

    /// Classify a request without running it.
    pub fn classify(&self, request: &InterceptedRequest) -> StrategyDecision {
        self.router.classify(request)
    }

    /// Wait for all background work started by earlier events.
    pub async fn settle(&self) -> usize {
        self.pending.settle().await
    }

    async fn transition(&self, expected: WorkerState, next: WorkerState) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle.write().await;
        if lifecycle.state != expected {
            return Err(Error::InvalidState(format!(
                "cannot move to {next}: worker is {}, expected {expected}",
                lifecycle.state
            )));
        }
        lifecycle.state = next;
        Ok(())
    }

    async fn set_state(&self, state: WorkerState) {
        self.lifecycle.write().await.state = state;
    }

    async fn request_skip_waiting(&self) {
        self.lifecycle.write().await.skip_waiting = true;
        if let Err(e) = self.clients.skip_waiting().await {
            tracing::warn!(error = %e, "skip waiting failed");
        }
    }

    /// Install event: store every precache asset, then skip waiting.
    ///
    /// Returns the number of assets stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` if any asset could not be fetched or
    /// stored; the worker becomes `redundant`.
    pub async fn install(&self) -> Result<usize, Error> {
        self.transition(WorkerState::Parsed, WorkerState::Installing).await?;
        tracing::info!(assets = self.precache.len(), "installing service worker");

        match self
            .generations
            .ensure_static_primed(self.network.as_ref(), &self.precache)
            .await
        {
            Ok(count) => {
                self.set_state(WorkerState::Installed).await;
                self.request_skip_waiting().await;
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "error caching static assets");
                self.set_state(WorkerState::Redundant).await;
                Err(e)
            }
        }
    }

    /// Activate event: purge stale generations, then claim open pages.
    ///
    /// Returns the names of the deleted generations.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.transition(WorkerState::Installed, WorkerState::Activating).await?;
        tracing::info!("activating service worker");

        let deleted = match self.generations.reconcile().await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!(error = %e, "cache cleanup failed");
                self.set_state(WorkerState::Installed).await;
                return Err(e);
            }
        };

        if let Err(e) = self.clients.claim().await {
            self.set_state(WorkerState::Installed).await;
            return Err(e);
        }

        self.set_state(WorkerState::Activated).await;
        tracing::info!(deleted = deleted.len(), "service worker activated");
        Ok(deleted)
    }

    /// Fetch event.
    ///
    /// # Errors
    ///
    /// Network-first requests fail with the network error when nothing is cached.
    pub async fn handle_fetch(&self, request: &InterceptedRequest) -> Result<FetchOutcome, Error> {
        let decision = self.router.classify(request);
        self.strategies.execute(decision, request).await
    }

    /// Message event. Returns the message if it was understood.
    pub async fn handle_message(&self, data: &serde_json::Value) -> Option<WorkerMessage> {
        tracing::info!(%data, "message received");
        let message = WorkerMessage::parse(data)?;
        match message {
            WorkerMessage::SkipWaiting => self.request_skip_waiting().await,
        }
        Some(message)
    }

    /// Background sync event. Returns whether the tag was recognized.
    pub async fn handle_sync(&self, tag: &str) -> bool {
        tracing::info!(tag, "background sync triggered");
        if tag != TASK_SYNC_TAG {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return false;
        }

        match self.hooks.sync_tasks().await {
            Ok(replayed) => {
                tracing::info!(replayed, "task sync finished");
                let message = ClientMessage::SyncComplete { message: SYNC_COMPLETE_MESSAGE.to_string() };
                if let Err(e) = self.clients.post_message(message).await {
                    tracing::error!(error = %e, "could not notify pages of sync completion");
                }
            }
            Err(e) => tracing::error!(error = %e, "task sync failed"),
        }
        true
    }

    /// Periodic sync event. Returns whether the tag was recognized.
    pub async fn handle_periodic_sync(&self, tag: &str) -> bool {
        tracing::info!(tag, "periodic sync triggered");
        if tag != TASK_REMINDERS_TAG {
            tracing::debug!(tag, "ignoring unknown periodic sync tag");
            return false;
        }

        if let Err(e) = self.hooks.check_reminders().await {
            tracing::error!(error = %e, "task reminder check failed");
        }
        true
    }

    /// Push event: show a notification built from the payload.
    pub async fn handle_push(&self, payload: Option<&str>) -> Result<Notification, Error> {
        tracing::info!("push notification received");
        let notification = Notification {
            title: self.app_name.clone(),
            body: payload.unwrap_or(DEFAULT_PUSH_BODY).to_string(),
            icon: "/icon-192x192.png".into(),
            badge: "/icon-72x72.png".into(),
            vibrate: vec![200, 100, 200],
            url: "/".into(),
            actions: vec![
                NotificationAction { action: "view".into(), title: "View Tasks".into() },
                NotificationAction { action: "dismiss".into(), title: "Dismiss".into() },
            ],
        };
        self.clients.show_notification(notification.clone()).await?;
        Ok(notification)
    }

    /// Notification click: close it, and open the root page for `view`.
    pub async fn handle_notification_click(&self, action: Option<&str>) -> Result<(), Error> {
        tracing::info!(action, "notification clicked");
        if let Err(e) = self.clients.close_notification().await {
            tracing::warn!(error = %e, "could not close notification");
        }

        if action == Some("view") {
            let root = resolve(&self.origin, "/")?;
            self.clients.open_window(&root).await?;
        }
        Ok(())
    }
}
