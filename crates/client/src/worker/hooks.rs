//! Extension points for background sync and periodic reminder checks.
//!
//! A full implementation of `sync_tasks` reads the mutations made while
//! offline, replays them against the remote endpoint and updates the local
//! cache. The default hooks only log.

use async_trait::async_trait;
use smarttask_core::Error;

#[async_trait]
pub trait BackgroundHooks: Send + Sync {
    /// Replay pending offline mutations. Returns how many were replayed.
    async fn sync_tasks(&self) -> Result<usize, Error>;

    /// Look for overdue or upcoming tasks worth a reminder.
    async fn check_reminders(&self) -> Result<(), Error>;
}

/// Hooks that do nothing but log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHooks;

#[async_trait]
impl BackgroundHooks for LoggingHooks {
    async fn sync_tasks(&self) -> Result<usize, Error> {
        tracing::info!("syncing tasks");
        Ok(0)
    }

    async fn check_reminders(&self) -> Result<(), Error> {
        tracing::info!("checking task reminders");
        Ok(())
    }
}
