//! Exactly-once unregistration for a live connection.

use std::sync::atomic::{AtomicBool, Ordering};

use dochub_core::types::{ConnectionId, UserId};

use crate::hub::Hub;

/// Unregisters its connection when released or dropped, whichever comes first.
///
/// Dropping covers every exit path of the connection task, including panics.
#[derive(Debug)]
pub struct ConnectionGuard {
    hub: Hub,
    user_id: UserId,
    conn_id: ConnectionId,
    released: AtomicBool,
}

impl ConnectionGuard {
    /// Guard a connection that has just been registered.
    pub fn new(hub: Hub, user_id: UserId, conn_id: ConnectionId) -> Self {
        Self {
            hub,
            user_id,
            conn_id,
            released: AtomicBool::new(false),
        }
    }

    /// Unregister now. Returns `false` if this guard already did.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.hub.unregister(self.user_id, self.conn_id);
        true
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use dochub_core::config::RealtimeConfig;
    use tokio::sync::watch;

    use super::*;
    use crate::connection::LiveConnection;

    #[tokio::test]
    async fn test_release_runs_once() {
        let (_tx, rx) = watch::channel(false);
        let (hub, _task) = Hub::spawn(RealtimeConfig::default(), rx);
        let user = UserId::new();
        let (conn, _out) = LiveConnection::channel(user, 4);
        let guard = ConnectionGuard::new(hub.clone(), user, conn.id);
        hub.register(conn);
        assert_eq!(hub.connection_count().await, 1);

        assert!(guard.release());
        assert!(!guard.release());
        drop(guard);
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_drop_unregisters_after_panic() {
        let (_tx, rx) = watch::channel(false);
        let (hub, _task) = Hub::spawn(RealtimeConfig::default(), rx);
        let user = UserId::new();
        let (conn, _out) = LiveConnection::channel(user, 4);
        let guard = ConnectionGuard::new(hub.clone(), user, conn.id);
        hub.register(conn);

        let task = tokio::spawn(async move {
            let _guard = guard;
            panic!("read loop failure");
        });
        assert!(task.await.is_err());
        assert_eq!(hub.connection_count().await, 0);
    }
}
