//! Transport seam: connection traits and identifiers.
//!
//! # Responsibilities
//! - Define the capabilities the pool needs from a transport session
//! - Generate unique connection IDs for transports without a channel id
//!
//! The pool never sees bytes. It drives connection lifecycle and heartbeat
//! probes through [`Connection`], and opens sessions through [`Connector`];
//! wire encoding, authentication, and payload writes all live behind the
//! implementing transport.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::host::HostAddress;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is sufficient since we only need uniqueness.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for a connection, used to correlate
/// asynchronous heartbeat acknowledgements with pool members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One session to an ingestion proxy.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Stable identity, echoed back in heartbeat acknowledgements.
    fn id(&self) -> ConnectionId;

    /// The remote endpoint this session is bound to.
    fn host(&self) -> &HostAddress;

    /// Whether the underlying session is still usable.
    fn is_active(&self) -> bool;

    /// Write one heartbeat probe frame. Encoding is the transport's concern;
    /// the eventual response arrives via the pool's ack entry point.
    async fn send_heartbeat(&self) -> io::Result<()>;

    /// Block until in-flight sends on this session are acknowledged or the
    /// transport's drain bound is reached.
    async fn wait_for_acks(&self);

    /// Tear the session down. Idempotent.
    async fn close(&self);
}

/// Opens transport sessions on behalf of the pool.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection;

    /// Establish a session to `host`. A failure here is transient: the pool
    /// logs it and moves on, it is never surfaced to the send path.
    async fn connect(&self, host: &HostAddress) -> io::Result<Self::Conn>;
}

/// Forward the connector capability through a shared handle, so an
/// `Arc<C>` can be handed to the pool wherever a `Connector` is expected.
#[async_trait]
impl<C: Connector + ?Sized> Connector for Arc<C> {
    type Conn = C::Conn;

    async fn connect(&self, host: &HostAddress) -> io::Result<Self::Conn> {
        (**self).connect(host).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId::new();
        assert_eq!(format!("{id}"), format!("conn-{}", id.as_u64()));
    }
}
