//! Pool membership, selection, and the repair/rebalance pass.
//!
//! # Responsibilities
//! - Own every connection: active set, standby set, bad-host memory
//! - Serve the send path round-robin without blocking on maintenance
//! - Detect dead connections and rebuild capacity from the host list
//! - Swap the worst-loaded active connection for the idlest standby one

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::config::schema::PoolConfig;
use crate::net::{dedup_hosts, pick_random, Connection, ConnectionId, Connector, HostAddress};
use crate::observability::metrics;

use super::load::LoadTracker;
use super::member::Member;

/// Membership state guarded by the topology lock.
struct Topology<C> {
    /// Most recently supplied candidate list, deduplicated.
    hosts: Vec<HostAddress>,
    /// Connections eligible for sends. At most one per host.
    active: HashMap<HostAddress, Arc<Member<C>>>,
    /// Load-probe connections, rebuilt every load cycle.
    standby: HashMap<HostAddress, Arc<Member<C>>>,
    /// Host → failure count. Cleared on successful reconnect, never by time.
    bad_hosts: HashMap<HostAddress, u64>,
    active_target: usize,
    total_target: usize,
}

impl<C> Topology<C> {
    fn total(&self) -> usize {
        self.active.len() + self.standby.len()
    }

    fn is_connected(&self, host: &HostAddress) -> bool {
        self.active.contains_key(host) || self.standby.contains_key(host)
    }
}

/// Observability view of the pool's membership.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub active: Vec<HostAddress>,
    pub standby: Vec<HostAddress>,
    pub bad_hosts: HashMap<HostAddress, u64>,
}

/// Client-side connection pool over an externally supplied host list.
///
/// Membership mutations (host-list swaps, the maintenance pass) serialize on
/// one topology lock. The send path never takes that lock: it round-robins
/// an atomic cursor over an arc-swapped snapshot of the active set, so sends
/// only ever race the pointer swap itself.
pub struct ConnectionPool<T: Connector> {
    connector: T,
    config: PoolConfig,
    topology: Mutex<Topology<T::Conn>>,
    selection: ArcSwap<Vec<Arc<Member<T::Conn>>>>,
    cursor: AtomicUsize,
    tracker: LoadTracker,
    /// Ticks since the current load window opened; slot index derives from it.
    load_cycle: AtomicU32,
    /// Lifetime tick count, used only to skip the very first heartbeat round.
    ticks: AtomicU64,
}

impl<T: Connector> ConnectionPool<T> {
    /// The configuration must have passed [`crate::config::validation`].
    pub fn new(config: PoolConfig, connector: T) -> Self {
        let tracker = LoadTracker::new(config.balancing.cycle, config.balancing.weights.clone());
        Self {
            connector,
            topology: Mutex::new(Topology {
                hosts: Vec::new(),
                active: HashMap::new(),
                standby: HashMap::new(),
                bad_hosts: HashMap::new(),
                active_target: 0,
                total_target: 0,
            }),
            selection: ArcSwap::from_pointee(Vec::new()),
            cursor: AtomicUsize::new(0),
            tracker,
            load_cycle: AtomicU32::new(0),
            ticks: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn balancing_enabled(&self) -> bool {
        self.config.balancing.load_threshold > 0
    }

    /// Replace the candidate host list and rebuild the pool from scratch.
    ///
    /// Every current connection is drained and closed, then a random subset
    /// of the new list is connected: the first `active_target` into the
    /// active set, the rest into standby. Per-host connect failures are
    /// logged and skipped.
    pub async fn set_host_list(&self, hosts: Vec<HostAddress>) {
        let hosts = dedup_hosts(hosts);
        let mut topo = self.topology.lock().await;

        let (active_target, total_target) = self.compute_targets(hosts.len());
        topo.hosts = hosts;
        topo.active_target = active_target;
        topo.total_target = total_target;

        self.close_all(&mut topo).await;
        self.reset_cycle();

        let picks = pick_random(&topo.hosts, topo.total_target);
        for host in picks {
            self.try_connect(&mut topo, host).await;
        }

        self.cursor.store(0, Ordering::Relaxed);
        self.publish(&topo);
        metrics::record_pool_size(topo.active.len(), topo.standby.len());
        tracing::info!(
            hosts = topo.hosts.len(),
            active = topo.active.len(),
            standby = topo.standby.len(),
            "rebuilt pool from new host list"
        );
    }

    /// Active / total connection targets for `available` distinct hosts.
    ///
    /// With rebalancing disabled the pool holds only active connections.
    /// With it enabled, a standby margin is added on top of the active
    /// target, capped by what the fleet can actually provide.
    fn compute_targets(&self, available: usize) -> (usize, usize) {
        let configured = self.config.pool.active_connections;
        let margin = self.config.pool.standby_margin;
        if !self.balancing_enabled() {
            if configured > available {
                tracing::warn!(configured, available, "not enough hosts for the configured pool size");
            }
            let target = configured.min(available);
            (target, target)
        } else if configured >= available {
            tracing::warn!(configured, available, "no spare hosts left for load probing");
            (available, available)
        } else if configured + margin > available {
            tracing::warn!(
                spare = available - configured,
                margin,
                "fewer spare hosts than the standby margin"
            );
            (configured, available)
        } else {
            (configured, configured + margin)
        }
    }

    /// Pick the next live active connection, probing each active member at
    /// most once. `None` means nothing healthy is available right now; the
    /// pool will self-heal on subsequent maintenance ticks.
    pub fn select_for_send(&self) -> Option<Arc<Member<T::Conn>>> {
        let snapshot = self.selection.load();
        let len = snapshot.len();
        if len == 0 {
            return None;
        }
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        for probe in 0..len {
            let member = &snapshot[(start + probe) % len];
            if member.is_selectable() {
                return Some(Arc::clone(member));
            }
        }
        None
    }

    /// Backpressure hint from the transport: exclude the connection from
    /// selection and let the next repair pass close and replace it.
    pub fn mark_frozen(&self, id: ConnectionId) {
        match self.find_active(id) {
            Some(member) => {
                member.set_frozen();
                tracing::info!(%id, host = %member.host(), "connection frozen");
            }
            // Already evicted between the hint being raised and delivered.
            None => tracing::debug!(%id, "frozen hint for unknown connection"),
        }
    }

    /// Backpressure hint from the transport, recorded for the send layer.
    pub fn mark_busy(&self, id: ConnectionId) {
        match self.find_active(id) {
            Some(member) => member.set_busy(true),
            None => tracing::debug!(%id, "busy hint for unknown connection"),
        }
    }

    pub fn clear_busy(&self, id: ConnectionId) {
        if let Some(member) = self.find_active(id) {
            member.set_busy(false);
        }
    }

    fn find_active(&self, id: ConnectionId) -> Option<Arc<Member<T::Conn>>> {
        self.selection
            .load()
            .iter()
            .find(|member| member.id() == id)
            .cloned()
    }

    /// Asynchronous heartbeat response from the transport's inbound handler.
    ///
    /// Negative load is the server's "no opinion" sentinel and is dropped,
    /// as is anything arriving before the first maintenance tick or after a
    /// window reset. Valid samples land at slot (cycle - 1) mod CYCLE.
    pub fn notify_heartbeat_ack(&self, id: ConnectionId, load: i16) {
        let cycle = self.load_cycle.load(Ordering::Relaxed);
        if load < 0 || cycle == 0 {
            return;
        }
        let slot = ((cycle - 1) as usize) % self.config.balancing.cycle;
        self.tracker.record(id, slot, load);
    }

    /// One maintenance pass: heartbeat dispatch, failure repair, and (once a
    /// full load window has elapsed) load-based rebalancing. Driven by the
    /// [`crate::maintenance::MaintenanceCoordinator`] on a jittered cadence.
    pub async fn maintain_once(&self) {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        self.load_cycle.fetch_add(1, Ordering::Relaxed);
        if tick > 1 {
            self.send_heartbeats().await;
        }
        self.repair().await;
    }

    /// Probe every live pooled connection. Responses come back later through
    /// [`Self::notify_heartbeat_ack`]; this never waits for them.
    async fn send_heartbeats(&self) {
        let members: Vec<Arc<Member<T::Conn>>> = {
            let topo = self.topology.lock().await;
            topo.active
                .values()
                .chain(topo.standby.values())
                .cloned()
                .collect()
        };
        let probes = members
            .iter()
            .filter(|member| member.is_active())
            .map(|member| async move {
                if let Err(e) = member.send_heartbeat().await {
                    tracing::warn!(id = %member.id(), host = %member.host(), error = %e, "heartbeat write failed");
                }
            });
        join_all(probes).await;
    }

    /// Failure detection and repair, holding the topology lock throughout.
    async fn repair(&self) {
        let mut topo = self.topology.lock().await;

        // Partition by liveness. A frozen member counts as unhealthy so that
        // backpressure-frozen connections get closed and replaced here.
        let mut unhealthy: Vec<Arc<Member<T::Conn>>> = Vec::new();
        let mut healthy_hosts: Vec<HostAddress> = Vec::new();
        for member in topo.active.values().chain(topo.standby.values()) {
            if member.is_selectable() {
                healthy_hosts.push(member.host().clone());
            } else {
                unhealthy.push(Arc::clone(member));
            }
        }

        for member in &unhealthy {
            let host = member.host().clone();
            tracing::warn!(host = %host, id = %member.id(), "connection dead, evicting");
            member.wait_for_acks().await;
            member.close().await;
            topo.active.remove(&host);
            topo.standby.remove(&host);
            self.tracker.forget(member.id());
            *topo.bad_hosts.entry(host).or_insert(0) += 1;
            metrics::record_eviction();
        }
        for host in &healthy_hosts {
            topo.bad_hosts.remove(host);
        }

        let cycle = self.load_cycle.load(Ordering::Relaxed) as usize;
        if unhealthy.is_empty() && topo.active.len() >= topo.active_target {
            if cycle >= self.config.balancing.cycle {
                if self.balancing_enabled() && !topo.standby.is_empty() && !topo.active.is_empty() {
                    self.rebalance(&mut topo).await;
                } else if topo.total() < topo.total_target {
                    tracing::info!(
                        total = topo.total(),
                        target = topo.total_target,
                        "window elapsed, topping pool back up"
                    );
                    self.top_up(&mut topo).await;
                }
                self.reset_cycle();
            }
            self.publish(&topo);
            metrics::record_pool_size(topo.active.len(), topo.standby.len());
            return;
        }

        // Something died or active is short: rebuild what we can this tick.
        self.reset_cycle();

        let candidates: Vec<HostAddress> = topo
            .hosts
            .iter()
            .filter(|host| !topo.is_connected(host) && !topo.bad_hosts.contains_key(*host))
            .cloned()
            .collect();
        let shortfall = topo
            .total_target
            .saturating_sub(topo.total())
            .min(candidates.len());
        for host in pick_random(&candidates, shortfall) {
            self.try_connect(&mut topo, host).await;
        }

        // Reconnects were not enough: draw down the standby pool.
        while topo.active.len() < topo.active_target {
            let Some(host) = topo.standby.keys().next().cloned() else {
                break;
            };
            if let Some(member) = topo.standby.remove(&host) {
                tracing::info!(host = %host, "promoting standby connection into active pool");
                topo.active.insert(host, member);
            }
        }

        // Last resort: retry known-bad hosts, least-failed first.
        if topo.active.len() < topo.active_target {
            let mut retries: Vec<(HostAddress, u64)> = topo
                .bad_hosts
                .iter()
                .filter(|(host, _)| !topo.is_connected(host))
                .map(|(host, &failures)| (host.clone(), failures))
                .collect();
            retries.sort_by_key(|(_, failures)| *failures);
            for (host, failures) in retries {
                if topo.active.len() >= topo.active_target {
                    break;
                }
                tracing::info!(host = %host, failures, "retrying previously failed host");
                if self.try_connect(&mut topo, host.clone()).await {
                    topo.bad_hosts.remove(&host);
                }
            }
        }

        self.publish(&topo);
        metrics::record_pool_size(topo.active.len(), topo.standby.len());
        tracing::info!(
            active = topo.active.len(),
            standby = topo.standby.len(),
            bad_hosts = topo.bad_hosts.len(),
            "repair pass complete"
        );
    }

    /// Load-based rebalancing: at most one swap per window, between the
    /// worst-loaded active connection and the idlest standby one. Whatever
    /// standby connections remain afterwards are discarded: standby is a
    /// probe pool, not a warm spare set.
    async fn rebalance(&self, topo: &mut Topology<T::Conn>) {
        let mut active_ranked = self.ranked(&topo.active);
        let mut standby_ranked = self.ranked(&topo.standby);
        active_ranked.sort_by(|a, b| b.1.cmp(&a.1));
        standby_ranked.sort_by(|a, b| a.1.cmp(&b.1));

        if let (Some((worst, worst_load)), Some((best, best_load))) =
            (active_ranked.first(), standby_ranked.first())
        {
            let gap = *worst_load as i64 - *best_load as i64;
            if gap >= self.config.balancing.load_threshold as i64 {
                let out_host = worst.host().clone();
                let in_host = best.host().clone();
                tracing::info!(
                    out = %out_host,
                    out_load = *worst_load,
                    promoted = %in_host,
                    promoted_load = *best_load,
                    "swapping loaded active connection for idle standby"
                );
                worst.set_frozen();
                worst.wait_for_acks().await;
                worst.close().await;
                topo.active.remove(&out_host);
                self.tracker.forget(worst.id());
                if let Some(member) = topo.standby.remove(&in_host) {
                    topo.active.insert(in_host, member);
                }
                metrics::record_rebalance_swap();
            } else {
                tracing::debug!(
                    gap,
                    threshold = self.config.balancing.load_threshold,
                    "load gap below threshold, no swap"
                );
            }
        }

        let leftovers: Vec<Arc<Member<T::Conn>>> =
            topo.standby.drain().map(|(_, member)| member).collect();
        join_all(leftovers.iter().map(|member| member.close())).await;
        for member in &leftovers {
            self.tracker.forget(member.id());
        }

        if topo.total() < topo.total_target {
            self.top_up(topo).await;
        }
    }

    fn ranked(
        &self,
        set: &HashMap<HostAddress, Arc<Member<T::Conn>>>,
    ) -> Vec<(Arc<Member<T::Conn>>, u32)> {
        set.values()
            .filter_map(|member| {
                self.tracker
                    .weighted_average(member.id())
                    .map(|avg| (Arc::clone(member), avg))
            })
            .collect()
    }

    /// Reconnect toward the total target from hosts not currently pooled.
    async fn top_up(&self, topo: &mut Topology<T::Conn>) {
        let unused: Vec<HostAddress> = topo
            .hosts
            .iter()
            .filter(|host| !topo.is_connected(host))
            .cloned()
            .collect();
        let need = topo
            .total_target
            .saturating_sub(topo.total())
            .min(unused.len());
        for host in pick_random(&unused, need) {
            self.try_connect(&mut *topo, host).await;
        }
    }

    /// Open a connection to `host` and file it by the fill rule: active
    /// until the active target is met, standby after that.
    async fn try_connect(&self, topo: &mut Topology<T::Conn>, host: HostAddress) -> bool {
        if topo.is_connected(&host) {
            // Membership may have changed while the caller assembled its
            // candidate list; re-check under the lock.
            tracing::debug!(host = %host, "already connected, skipping");
            return false;
        }
        match self.connector.connect(&host).await {
            Ok(conn) => {
                let member = Arc::new(Member::new(conn));
                if topo.active.len() < topo.active_target {
                    tracing::info!(host = %host, id = %member.id(), "connected, joining active pool");
                    topo.active.insert(host, member);
                } else {
                    tracing::info!(host = %host, id = %member.id(), "connected, joining standby pool");
                    topo.standby.insert(host, member);
                }
                true
            }
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "connect failed");
                metrics::record_connect_failure();
                false
            }
        }
    }

    /// Drain and close every owned connection. Used by host-list rebuilds
    /// and by [`Self::close`]; each connection is closed exactly once.
    async fn close_all(&self, topo: &mut Topology<T::Conn>) {
        let members: Vec<Arc<Member<T::Conn>>> = topo
            .active
            .drain()
            .map(|(_, member)| member)
            .chain(topo.standby.drain().map(|(_, member)| member))
            .collect();
        if members.is_empty() {
            return;
        }
        tracing::info!(count = members.len(), "closing all pooled connections");
        join_all(members.iter().map(|member| async move {
            if member.is_active() {
                member.wait_for_acks().await;
            }
            member.close().await;
        }))
        .await;
        self.tracker.clear();
    }

    /// Shut the pool down: drain and close everything, forget all state.
    pub async fn close(&self) {
        let mut topo = self.topology.lock().await;
        self.close_all(&mut topo).await;
        topo.bad_hosts.clear();
        self.cursor.store(0, Ordering::Relaxed);
        self.publish(&topo);
        metrics::record_pool_size(0, 0);
        tracing::info!("pool closed");
    }

    /// Current membership, for logging and tests.
    pub async fn snapshot(&self) -> PoolSnapshot {
        let topo = self.topology.lock().await;
        PoolSnapshot {
            active: topo.active.keys().cloned().collect(),
            standby: topo.standby.keys().cloned().collect(),
            bad_hosts: topo.bad_hosts.clone(),
        }
    }

    /// Whether `host` currently backs a pooled connection.
    pub async fn contains_host(&self, host: &HostAddress) -> bool {
        self.topology.lock().await.is_connected(host)
    }

    fn publish(&self, topo: &Topology<T::Conn>) {
        let snapshot: Vec<Arc<Member<T::Conn>>> = topo.active.values().cloned().collect();
        self.selection.store(Arc::new(snapshot));
    }

    fn reset_cycle(&self) {
        self.load_cycle.store(0, Ordering::Relaxed);
        self.tracker.clear();
    }
}
