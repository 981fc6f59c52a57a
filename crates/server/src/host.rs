//! Host side of the worker: records every effect the worker asks of the
//! runtime so tool responses can report them.

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::Serialize;
use smarttask_client::{ClientMessage, Clients, Notification};
use smarttask_core::Error;
use tokio::sync::Mutex;
use url::Url;

/// An effect the worker produced on the host.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEffect {
    SkipWaiting,
    Claim,
    Message { message: ClientMessage },
    ShowNotification { notification: Notification },
    CloseNotification,
    OpenWindow { url: String },
}

/// A recorded effect with its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct HostEvent {
    /// ISO8601 time the effect was requested.
    pub at: String,
    #[serde(flatten)]
    pub effect: HostEffect,
}

/// Effect log shared by every worker version the runtime hosts.
#[derive(Debug, Default)]
pub struct HostLog {
    events: Mutex<Vec<HostEvent>>,
}

impl HostLog {
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(&self, effect: HostEffect) {
        tracing::debug!(?effect, "host effect");
        self.events.lock().await.push(HostEvent { at: Utc::now().to_rfc3339(), effect });
    }

    /// Take every effect recorded since the last drain.
    pub async fn drain(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.lock().await)
    }
}

#[async_trait]
impl Clients for HostLog {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.record(HostEffect::SkipWaiting).await;
        Ok(())
    }

    async fn claim(&self) -> Result<(), Error> {
        self.record(HostEffect::Claim).await;
        Ok(())
    }

    async fn post_message(&self, message: ClientMessage) -> Result<(), Error> {
        self.record(HostEffect::Message { message }).await;
        Ok(())
    }

    async fn show_notification(&self, notification: Notification) -> Result<(), Error> {
        self.record(HostEffect::ShowNotification { notification }).await;
        Ok(())
    }

    async fn close_notification(&self) -> Result<(), Error> {
        self.record(HostEffect::CloseNotification).await;
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(HostEffect::OpenWindow { url: url.to_string() }).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_empties_log() {
        let log = HostLog::new();
        log.claim().await.unwrap();
        log.open_window(&Url::parse("http://localhost:3000/").unwrap()).await.unwrap();

        let events = log.drain().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].effect, HostEffect::Claim);
        assert_eq!(events[1].effect, HostEffect::OpenWindow { url: "http://localhost:3000/".into() });
        assert!(log.drain().await.is_empty());
    }

    #[tokio::test]
    async fn test_event_wire_format() {
        let log = HostLog::new();
        log.post_message(ClientMessage::SyncComplete { message: "Tasks synced successfully".into() })
            .await
            .unwrap();

        let json = serde_json::to_value(&log.drain().await[0]).unwrap();
        assert_eq!(json["kind"], "message");
        assert_eq!(json["message"]["type"], "SYNC_COMPLETE");
        assert!(json["at"].is_string());
    }
}
