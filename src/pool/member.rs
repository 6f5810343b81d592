//! Pooled connection wrapper.

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::net::{Connection, ConnectionId, HostAddress};

/// A connection owned by the pool, together with the administrative flags
/// the transport layer may raise against it.
///
/// `frozen` takes a connection out of selection until the next repair pass
/// closes it; `busy` is a backpressure hint recorded for the send layer and
/// deliberately does not affect selection.
pub struct Member<C> {
    conn: C,
    frozen: AtomicBool,
    busy: AtomicBool,
}

impl<C: Connection> Member<C> {
    pub(crate) fn new(conn: C) -> Self {
        Self {
            conn,
            frozen: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.conn.id()
    }

    pub fn host(&self) -> &HostAddress {
        self.conn.host()
    }

    /// Eligible for the send path: live and not frozen. The repair pass uses
    /// the same predicate, so a frozen member is evicted on the next tick.
    pub fn is_selectable(&self) -> bool {
        self.conn.is_active() && !self.is_frozen()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Relaxed)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    pub(crate) fn set_frozen(&self) {
        self.frozen.store(true, Ordering::Relaxed);
    }

    pub(crate) fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Relaxed);
    }

    /// The underlying transport session, for the send layer.
    pub fn connection(&self) -> &C {
        &self.conn
    }
}

impl<C: Connection> Deref for Member<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}
