//! Top-level real-time engine wiring the hub, dispatcher and push supervisor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use dochub_core::config::{PushConfig, RealtimeConfig};
use dochub_database::Stores;
use dochub_push::PushService;

use crate::hub::Hub;
use crate::notification::{DeliveryDispatcher, PushSupervisor};

/// Everything the HTTP layer needs for live delivery.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Connection registry.
    pub hub: Hub,
    /// Notification fan-out.
    pub dispatcher: DeliveryDispatcher,
    /// Background push attempts.
    pub push: PushSupervisor,
    config: RealtimeConfig,
    hub_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RealtimeEngine {
    /// Start the hub actor and build the dispatcher.
    ///
    /// The hub stops when `shutdown` flips to `true`.
    pub fn start(
        config: &RealtimeConfig,
        push_config: &PushConfig,
        stores: &Stores,
        push: PushService,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (hub, hub_task) = Hub::spawn(config.clone(), shutdown);
        let push = PushSupervisor::new(
            push,
            push_config.max_in_flight,
            Duration::from_secs(push_config.drain_timeout_seconds),
        );
        let dispatcher = DeliveryDispatcher::new(
            hub.clone(),
            stores.users.clone(),
            stores.notifications.clone(),
            push.clone(),
            push_config.default_title.clone(),
            push_config.role_title.clone(),
        );

        info!(
            buffer = config.connection_buffer_size,
            max_push_in_flight = push_config.max_in_flight,
            "Real-time engine initialized"
        );

        Self {
            hub,
            dispatcher,
            push,
            config: config.clone(),
            hub_task: Arc::new(Mutex::new(Some(hub_task))),
        }
    }

    /// Live connection settings.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Wait for the hub to stop, then drain push attempts.
    ///
    /// Call after the shutdown signal has been sent. Returns `true` if all
    /// push attempts finished in time.
    pub async fn stop(&self) -> bool {
        if let Some(task) = self.hub_task.lock().await.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Connection hub task ended abnormally");
            }
        }
        let drained = self.push.drain().await;
        info!(drained, "Real-time engine shut down");
        drained
    }
}
