//! The host side of the worker: the pages it controls and the system
//! notification surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smarttask_core::Error;
use url::Url;

/// Message posted from the worker to every open page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Background sync finished.
    SyncComplete { message: String },
}

/// A button shown on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A system notification raised by a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Page opened by the `view` action.
    pub url: String,
    pub actions: Vec<NotificationAction>,
}

/// Operations the worker asks of its host runtime.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Activate the new worker version without waiting for old pages to close.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of every open page immediately.
    async fn claim(&self) -> Result<(), Error>;

    /// Post a message to every controlled page.
    async fn post_message(&self, message: ClientMessage) -> Result<(), Error>;

    async fn show_notification(&self, notification: Notification) -> Result<(), Error>;

    /// Close the notification that was just clicked.
    async fn close_notification(&self) -> Result<(), Error>;

    /// Open (or focus) a page at `url`.
    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}
