//! The task that owns the registry map.

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use dochub_core::config::RealtimeConfig;
use dochub_core::types::{ConnectionId, UserId};

use crate::connection::{LiveConnection, SendStatus};
use crate::message::LiveEvent;

use super::HubCommand;

pub(crate) struct HubActor {
    connections: HashMap<UserId, Vec<LiveConnection>>,
    inbox: mpsc::UnboundedReceiver<HubCommand>,
    shutdown: watch::Receiver<bool>,
    max_per_user: usize,
}

impl HubActor {
    pub(crate) fn new(
        config: RealtimeConfig,
        inbox: mpsc::UnboundedReceiver<HubCommand>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            connections: HashMap::new(),
            inbox,
            shutdown,
            max_per_user: config.max_connections_per_user,
        }
    }

    pub(crate) async fn run(mut self) {
        info!(max_per_user = self.max_per_user, "Connection hub started");

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Connection hub received shutdown signal");
                        break;
                    }
                }
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        let open = self.total();
        // Dropping the senders ends every writer task.
        self.connections.clear();
        info!(closed = open, "Connection hub stopped");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(conn) => self.register(conn),
            HubCommand::Unregister { user_id, conn_id } => self.unregister(user_id, conn_id),
            HubCommand::Emit(event) => self.emit(&event),
            HubCommand::ConnectionCount { user_id, reply } => {
                let count = match user_id {
                    Some(user_id) => self.connections.get(&user_id).map_or(0, Vec::len),
                    None => self.total(),
                };
                let _ = reply.send(count);
            }
        }
    }

    fn register(&mut self, conn: LiveConnection) {
        let user_id = conn.user_id;
        let conn_id = conn.id;
        let bucket = self.connections.entry(user_id).or_default();

        if self.max_per_user > 0 && bucket.len() >= self.max_per_user {
            let evicted = bucket.remove(0);
            warn!(
                user_id = %user_id,
                conn_id = %evicted.id,
                max = self.max_per_user,
                "User at max connections, closing oldest"
            );
        }

        bucket.push(conn);
        info!(
            user_id = %user_id,
            conn_id = %conn_id,
            user_connections = bucket.len(),
            "Connection registered"
        );
    }

    fn unregister(&mut self, user_id: UserId, conn_id: ConnectionId) {
        let Some(bucket) = self.connections.get_mut(&user_id) else {
            return;
        };
        let before = bucket.len();
        bucket.retain(|c| c.id != conn_id);
        let removed = bucket.len() < before;
        if bucket.is_empty() {
            self.connections.remove(&user_id);
        }
        if removed {
            info!(user_id = %user_id, conn_id = %conn_id, "Connection unregistered");
        }
    }

    fn emit(&mut self, event: &LiveEvent) {
        let user_id = event.user_id;
        let Some(bucket) = self.connections.get_mut(&user_id) else {
            debug!(user_id = %user_id, "No live connections for user");
            return;
        };

        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to serialize live event");
                return;
            }
        };

        let mut delivered = 0usize;
        bucket.retain(|conn| match conn.send(frame.clone()) {
            SendStatus::Sent => {
                delivered += 1;
                true
            }
            SendStatus::Full => {
                warn!(
                    user_id = %user_id,
                    conn_id = %conn.id,
                    "Connection send buffer full, dropping event"
                );
                true
            }
            SendStatus::Closed => {
                debug!(user_id = %user_id, conn_id = %conn.id, "Pruning closed connection");
                false
            }
        });
        if bucket.is_empty() {
            self.connections.remove(&user_id);
        }

        debug!(user_id = %user_id, delivered, "Live event emitted");
    }

    fn total(&self) -> usize {
        self.connections.values().map(Vec::len).sum()
    }
}
