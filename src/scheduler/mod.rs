//! Expiry sweeping and deferred execution.
//!
//! The sweeper is the clock of the moderation lifecycle: a fixed-interval
//! scan whose worst case bounds how long an expired mute/ban can overstay.
//! The same substrate carries one-shot deferred work via [`run_after`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::RuntimeConfig;
use crate::database::models::now_ts;
use crate::database::repository::TaskRepo;
use crate::moderation::ModerationActions;

/// Run a future after a delay, detached from the caller.
///
/// Fire-and-forget: the work scheduled through this must be idempotent,
/// since nothing tracks or cancels it once spawned.
pub fn run_after<F>(delay: Duration, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task.await;
    });
}

/// Periodic scan that lifts expired punitive effects.
pub struct ExpirySweeper {
    tasks: Arc<TaskRepo>,
    actions: Arc<ModerationActions>,
    interval: Duration,
    batch: i64,
}

impl ExpirySweeper {
    pub fn new(tasks: Arc<TaskRepo>, actions: Arc<ModerationActions>, config: &RuntimeConfig) -> Self {
        Self {
            tasks,
            actions,
            interval: config.sweep_interval,
            batch: config.sweep_batch,
        }
    }

    /// Start the sweep loop on the runtime.
    ///
    /// The first tick fires immediately, so reversals that came due while
    /// the process was down are handled at startup. A failed sweep is
    /// logged and the loop continues.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("expiry sweeper started (interval {:?})", self.interval);

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep().await {
                    error!("expiry sweep failed: {:#}", e);
                }
            }
        })
    }

    /// One scan: fetch the due batch and revert each task.
    ///
    /// Tasks act on disjoint (guild, target, kind) keys, so they are
    /// reverted concurrently; a task concurrently cancelled by an event
    /// reactor just no-ops on its delete. Returns how many were processed.
    pub async fn sweep(&self) -> anyhow::Result<usize> {
        let now = now_ts();
        let due = self.tasks.due(now, self.batch).await?;

        if due.is_empty() {
            return Ok(0);
        }

        if due.len() as i64 >= self.batch {
            warn!(
                "sweep batch full ({} tasks); consider a shorter interval",
                due.len()
            );
        }

        let work = due.iter().map(|task| async move {
            if let Err(e) = self.actions.revert_expired(task).await {
                error!(
                    "failed to revert {} for user {} in guild {} ({}s overdue): {:#}",
                    task.kind.as_str(),
                    task.user_id,
                    task.guild_id,
                    ModerationActions::overstay_secs(task),
                    e
                );
            }
        });
        futures::future::join_all(work).await;

        Ok(due.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn run_after_waits_for_the_delay() {
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        run_after(Duration::from_secs(7), async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }
}
