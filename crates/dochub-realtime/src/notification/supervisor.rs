//! Bounded, drainable background push attempts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use dochub_push::{PushMessage, PushOutcome, PushService};

/// Owns every in-flight push attempt.
///
/// The dispatcher hands attempts over and never waits on them. At most
/// `max_in_flight` run at once; the rest queue for a permit. Shutdown waits
/// for the tracked tasks up to the drain timeout.
#[derive(Debug, Clone)]
pub struct PushSupervisor {
    service: PushService,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    drain_timeout: Duration,
}

impl PushSupervisor {
    /// Create a supervisor over `service`.
    pub fn new(service: PushService, max_in_flight: usize, drain_timeout: Duration) -> Self {
        Self {
            service,
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            drain_timeout,
        }
    }

    /// Start a push attempt in the background. Returns whether one was started.
    pub fn spawn(&self, token: Option<String>, message: PushMessage) -> bool {
        if !self.service.is_enabled() {
            return false;
        }
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            debug!(user_id = %message.user_id, "No push token, push skipped");
            return false;
        };

        let service = self.service.clone();
        let permits = self.permits.clone();
        self.tracker.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            match service.deliver(Some(&token), &message).await {
                Ok(PushOutcome::Delivered { provider }) => {
                    debug!(user_id = %message.user_id, provider, "Push attempt finished");
                }
                Ok(outcome) => {
                    debug!(user_id = %message.user_id, ?outcome, "Push attempt finished");
                }
                Err(e) => {
                    warn!(
                        user_id = %message.user_id,
                        provider = e.provider(),
                        error = %e,
                        "Push attempt failed"
                    );
                }
            }
        });
        true
    }

    /// The push service attempts are delivered through.
    pub fn service(&self) -> &PushService {
        &self.service
    }

    /// Number of attempts still running or waiting for a permit.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for in-flight attempts, up to the drain timeout.
    ///
    /// Returns `true` if everything finished in time.
    pub async fn drain(&self) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            info!(pending, "Draining in-flight push attempts");
        }
        let drained = tokio::time::timeout(self.drain_timeout, self.tracker.wait())
            .await
            .is_ok();
        if !drained {
            warn!(
                remaining = self.tracker.len(),
                "Push drain timed out, abandoning remaining attempts"
            );
        }
        self.tracker.reopen();
        drained
    }
}
