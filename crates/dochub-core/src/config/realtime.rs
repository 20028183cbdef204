//! Real-time WebSocket configuration.

use serde::{Deserialize, Serialize};

/// Live connection registry and WebSocket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer per connection. A full buffer drops the event for
    /// that connection instead of blocking the registry.
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer_size: usize,
    /// Upper bound on a single WebSocket frame write, in milliseconds.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
    /// Interval between server pings, in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Maximum live connections per user; `0` means unlimited.
    #[serde(default)]
    pub max_connections_per_user: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            connection_buffer_size: default_connection_buffer(),
            write_timeout_ms: default_write_timeout(),
            ping_interval_seconds: default_ping_interval(),
            max_connections_per_user: 0,
        }
    }
}

fn default_connection_buffer() -> usize {
    64
}

fn default_write_timeout() -> u64 {
    5000
}

fn default_ping_interval() -> u64 {
    30
}
