//! Periodic detection of due tasks.
//!
//! On every tick the sweep flags each task whose notification instant has
//! passed and that has not been notified yet, then publishes one
//! [`NotificationEvent`] per flagged task. The store lock is held only while
//! flagging; publishing happens after it is released.
//!
//! Ticks are independent: a failing or panicking tick is logged and the next
//! tick re-evaluates the store. Missed ticks are skipped, not replayed.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::broadcaster::{EventBroadcaster, NotificationEvent};
use crate::domain::Timestamp;
use crate::infrastructure::{RepositoryError, TaskRepository};

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Tasks flagged as notified during the tick.
    pub notified: usize,
    /// Sum over flagged tasks of the subscribers each event reached.
    pub delivered: usize,
}

/// The notification sweep.
#[derive(Clone)]
pub struct NotificationSweep {
    task_repository: Arc<dyn TaskRepository + Send + Sync>,
    broadcaster: EventBroadcaster,
    interval: Duration,
}

impl NotificationSweep {
    #[must_use]
    pub fn new(
        task_repository: Arc<dyn TaskRepository + Send + Sync>,
        broadcaster: EventBroadcaster,
        interval: Duration,
    ) -> Self {
        Self {
            task_repository,
            broadcaster,
            interval,
        }
    }

    /// Runs one tick against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the store could not be read.
    pub async fn tick(&self) -> Result<SweepReport, RepositoryError> {
        self.tick_at(Timestamp::now()).await
    }

    /// Runs one tick as if the current instant were `now`.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the store could not be read.
    pub async fn tick_at(&self, now: Timestamp) -> Result<SweepReport, RepositoryError> {
        let flagged = self.task_repository.mark_notified(now).await?;

        let mut report = SweepReport::default();
        for task in flagged {
            tracing::info!(
                task_id = %task.id,
                title = %task.title,
                due = %task.schedule.due_date_time,
                "Task is due soon"
            );
            report.notified += 1;
            report.delivered += self
                .broadcaster
                .publish(NotificationEvent::Notification(task));
        }

        Ok(report)
    }

    /// Ticks every `interval` until `shutdown` resolves. The first tick runs
    /// one interval after start.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(interval = ?self.interval, "Notification sweep started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => self.run_guarded_tick().await,
            }
        }

        tracing::info!("Notification sweep stopped");
    }

    async fn run_guarded_tick(&self) {
        match AssertUnwindSafe(self.tick()).catch_unwind().await {
            Ok(Ok(report)) if report.notified > 0 => {
                tracing::debug!(
                    notified = report.notified,
                    delivered = report.delivered,
                    "Sweep tick completed"
                );
            }
            Ok(Ok(_)) => {}
            Ok(Err(error)) => {
                tracing::error!(%error, "Error checking for notifications");
            }
            Err(_) => {
                tracing::error!("Notification sweep tick panicked");
            }
        }
    }

    /// Spawns the sweep on the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> SweepHandle {
        let (shutdown, receiver) = oneshot::channel();
        let join = tokio::spawn(self.run(receiver));
        SweepHandle { shutdown, join }
    }
}

/// Handle to a spawned sweep.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the sweep to stop and waits for it to finish its current tick.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(error) = self.join.await {
            tracing::warn!(%error, "Notification sweep task ended abnormally");
        }
    }
}
