//! Shared mock transport for pool integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ingest_pool::{Connection, ConnectionId, Connector, HostAddress, PoolConfig};

#[derive(Debug)]
pub struct MockConnState {
    id: ConnectionId,
    host: HostAddress,
    pub alive: AtomicBool,
    pub closed: AtomicBool,
    pub heartbeats: AtomicU32,
    pub drains: AtomicU32,
}

/// One mock session; clones share state so tests can observe what the pool
/// did to a connection it owns.
#[derive(Debug, Clone)]
pub struct MockConn(pub Arc<MockConnState>);

impl MockConn {
    pub fn is_closed(&self) -> bool {
        self.0.closed.load(Ordering::SeqCst)
    }

    pub fn heartbeat_count(&self) -> u32 {
        self.0.heartbeats.load(Ordering::SeqCst)
    }

    pub fn drain_count(&self) -> u32 {
        self.0.drains.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for MockConn {
    fn id(&self) -> ConnectionId {
        self.0.id
    }

    fn host(&self) -> &HostAddress {
        &self.0.host
    }

    fn is_active(&self) -> bool {
        self.0.alive.load(Ordering::SeqCst) && !self.0.closed.load(Ordering::SeqCst)
    }

    async fn send_heartbeat(&self) -> io::Result<()> {
        self.0.heartbeats.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for_acks(&self) {
        self.0.drains.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(&self) {
        self.0.closed.store(true, Ordering::SeqCst);
    }
}

/// In-memory connector: hands out [`MockConn`] sessions and keeps a registry
/// of everything it created so tests can kill hosts or inspect lifecycles.
#[derive(Debug, Default)]
pub struct MockConnector {
    refused: Mutex<HashSet<HostAddress>>,
    created: Mutex<Vec<MockConn>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make future connects to `host` fail.
    pub fn refuse(&self, host: &HostAddress) {
        self.refused.lock().unwrap().insert(host.clone());
    }

    pub fn allow(&self, host: &HostAddress) {
        self.refused.lock().unwrap().remove(host);
    }

    /// Mark every session to `host` dead, as a vanished server would.
    pub fn kill(&self, host: &HostAddress) {
        for conn in self.created.lock().unwrap().iter() {
            if conn.host() == host {
                conn.0.alive.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Most recent live session to `host`, if any.
    pub fn live_conn_for(&self, host: &HostAddress) -> Option<MockConn> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|conn| conn.host() == host && conn.is_active())
            .cloned()
    }

    pub fn all_conns(&self) -> Vec<MockConn> {
        self.created.lock().unwrap().clone()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Conn = MockConn;

    async fn connect(&self, host: &HostAddress) -> io::Result<Self::Conn> {
        if self.refused.lock().unwrap().contains(host) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ));
        }
        let conn = MockConn(Arc::new(MockConnState {
            id: ConnectionId::new(),
            host: host.clone(),
            alive: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            heartbeats: AtomicU32::new(0),
            drains: AtomicU32::new(0),
        }));
        self.created.lock().unwrap().push(conn.clone());
        Ok(conn)
    }
}

/// Route test logs through tracing when RUST_LOG is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// `n` distinct fleet hosts.
pub fn hosts(n: u16) -> Vec<HostAddress> {
    (0..n)
        .map(|i| HostAddress::new(format!("proxy-{i}"), 46801))
        .collect()
}

/// Config tuned for tests: sizing and threshold as given, defaults elsewhere.
pub fn test_config(active: usize, load_threshold: u32) -> PoolConfig {
    let mut config = PoolConfig::default();
    config.pool.active_connections = active;
    config.balancing.load_threshold = load_threshold;
    config
}

/// Config with a short load window so rebalancing triggers quickly.
pub fn short_window_config(active: usize, load_threshold: u32, cycle: usize) -> PoolConfig {
    let mut config = test_config(active, load_threshold);
    config.balancing.cycle = cycle;
    config.balancing.weights = vec![1; cycle];
    config
}
