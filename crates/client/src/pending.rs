//! Work the host must let settle before the worker may be stopped.
//!
//! Cache writes triggered by a fetch are not awaited by the strategy that
//! issued them; they are registered here instead, and the host awaits
//! [`PendingWork::settle`] once its event has been answered.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Registry of in-flight background tasks. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct PendingWork {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a background task and keep track of it.
    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.lock().await.spawn(task);
    }

    /// Number of tasks not yet collected by [`settle`](Self::settle).
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Wait for every registered task, including tasks registered while waiting.
    ///
    /// Returns the number of tasks that settled.
    pub async fn settle(&self) -> usize {
        let mut settled = 0;
        loop {
            let mut batch = std::mem::take(&mut *self.tasks.lock().await);
            if batch.is_empty() {
                return settled;
            }
            while let Some(result) = batch.join_next().await {
                if let Err(e) = result {
                    tracing::error!(error = %e, "background task did not complete");
                }
                settled += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_settle_waits_for_all_tasks() {
        let pending = PendingWork::new();
        let done = Arc::new(AtomicUsize::new(0));

        for delay in [30, 10, 20] {
            let done = done.clone();
            pending
                .spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        assert_eq!(pending.len().await, 3);
        assert_eq!(pending.settle().await, 3);
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert!(pending.is_empty().await);
    }

    #[tokio::test]
    async fn test_settle_collects_tasks_spawned_during_settle() {
        let pending = PendingWork::new();
        let inner = pending.clone();
        let done = Arc::new(AtomicUsize::new(0));
        let counter = done.clone();

        pending
            .spawn(async move {
                let counter = counter.clone();
                inner
                    .spawn(async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .await;
            })
            .await;

        assert_eq!(pending.settle().await, 2);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_settle_survives_panicking_task() {
        let pending = PendingWork::new();
        pending.spawn(async { panic!("boom"); }).await;
        assert_eq!(pending.settle().await, 1);
    }

    #[tokio::test]
    async fn test_settle_empty() {
        assert_eq!(PendingWork::new().settle().await, 0);
    }
}
