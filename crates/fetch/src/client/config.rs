use std::time::Duration;

use crate::transfer::PoolLimits;

/// Tunables for one [`Client`](crate::client::Client) instance.
///
/// Pool limits are applied to the transfer engine once, on the reactor
/// thread, before the event loop starts. The timeouts apply per transfer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Total connection cap across all hosts.
    pub max_connections: usize,
    /// Per-host connection cap, `0` means no per-host limit.
    pub max_connections_per_host: usize,
    /// Time allowed for connection establishment.
    pub connect_timeout: Duration,
    /// Time allowed for the whole transfer.
    pub request_timeout: Duration,
    /// Raises engine-level per-transfer diagnostics.
    pub debug_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            max_connections_per_host: 0,
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_millis(3000),
            debug_logging: false,
        }
    }
}

impl ClientConfig {
    pub(crate) fn pool_limits(&self) -> PoolLimits {
        PoolLimits { max_connections: self.max_connections, max_connections_per_host: self.max_connections_per_host }
    }
}
