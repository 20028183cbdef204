//! Periodic runner for the retention sweep.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing;

use dochub_core::config::RetentionConfig;

use crate::retention::RetentionSweeper;

/// Repeats the sweep every interval until shutdown.
#[derive(Debug)]
pub struct SweeperRunner {
    sweeper: RetentionSweeper,
    interval: Duration,
}

impl SweeperRunner {
    /// Create a runner from configuration.
    pub fn new(sweeper: RetentionSweeper, config: &RetentionConfig) -> Self {
        Self {
            sweeper,
            interval: Duration::from_secs(config.interval_hours.max(1) * 3600),
        }
    }

    /// Override the interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `cancel` flips to `true`.
    ///
    /// The first sweep happens one interval after start. Sweep failures are
    /// logged and the loop carries on.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Retention sweeper started"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Retention sweeper received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.sweeper.sweep_once(Utc::now()).await {
                        Ok(report) => tracing::info!(
                            notifications = report.notifications_deleted,
                            activity_logs = report.activity_logs_deleted,
                            "Retention sweep completed"
                        ),
                        Err(e) => tracing::error!(error = %e, "Retention sweep failed, will retry next interval"),
                    }
                }
            }
        }

        tracing::info!("Retention sweeper stopped");
    }
}
