//! Inbound messages posted by pages to the worker.

use serde::Deserialize;

/// Control messages the worker understands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Activate the waiting worker version now.
    SkipWaiting,
}

impl WorkerMessage {
    /// Parse a message payload; anything unrecognized yields `None`.
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        match serde_json::from_value(data.clone()) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unrecognized message");
                None
            }
        }
    }
}
