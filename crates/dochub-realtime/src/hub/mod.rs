//! Connection registry actor.
//!
//! A single task owns the `user -> connections` map. Every register,
//! unregister and emit is a command on one channel, so the map is never
//! shared and an emit can never race with removal of the connection it is
//! writing to.

pub mod actor;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use dochub_core::config::RealtimeConfig;
use dochub_core::types::{ConnectionId, UserId};

use crate::connection::LiveConnection;
use crate::message::LiveEvent;

use self::actor::HubActor;

/// Commands processed by the registry actor, in arrival order.
#[derive(Debug)]
pub(crate) enum HubCommand {
    Register(LiveConnection),
    Unregister {
        user_id: UserId,
        conn_id: ConnectionId,
    },
    Emit(LiveEvent),
    ConnectionCount {
        user_id: Option<UserId>,
        reply: oneshot::Sender<usize>,
    },
}

/// Cloneable handle to the registry actor.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl Hub {
    /// Start the actor. It stops when `shutdown` flips to `true` or every
    /// handle is dropped, closing all registered connections.
    pub fn spawn(config: RealtimeConfig, shutdown: watch::Receiver<bool>) -> (Self, JoinHandle<()>) {
        let (commands, inbox) = mpsc::unbounded_channel();
        let actor = HubActor::new(config, inbox, shutdown);
        let task = tokio::spawn(actor.run());
        (Self { commands }, task)
    }

    /// Add a connection under its owner. Duplicate users simply gain another entry.
    pub fn register(&self, conn: LiveConnection) {
        self.submit(HubCommand::Register(conn));
    }

    /// Remove one connection. No-op if it is already gone.
    pub fn unregister(&self, user_id: UserId, conn_id: ConnectionId) {
        self.submit(HubCommand::Unregister { user_id, conn_id });
    }

    /// Write `event` to every connection of `event.user_id`.
    pub fn emit(&self, event: LiveEvent) {
        self.submit(HubCommand::Emit(event));
    }

    /// Number of registered connections across all users.
    pub async fn connection_count(&self) -> usize {
        self.query_count(None).await
    }

    /// Number of registered connections for one user.
    pub async fn user_connection_count(&self, user_id: UserId) -> usize {
        self.query_count(Some(user_id)).await
    }

    async fn query_count(&self, user_id: Option<UserId>) -> usize {
        let (reply, rx) = oneshot::channel();
        self.submit(HubCommand::ConnectionCount { user_id, reply });
        rx.await.unwrap_or(0)
    }

    fn submit(&self, command: HubCommand) {
        if self.commands.send(command).is_err() {
            debug!("Hub has stopped, command dropped");
        }
    }
}
