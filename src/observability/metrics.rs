//! Metrics collection.
//!
//! # Metrics
//! - `pool_active_connections` (gauge): current active-set size
//! - `pool_standby_connections` (gauge): current standby-set size
//! - `pool_connect_failures_total` (counter): failed connect attempts
//! - `pool_evictions_total` (counter): dead connections evicted by repair
//! - `pool_rebalance_swaps_total` (counter): load-based active/standby swaps
//!
//! # Design Decisions
//! - This module only updates the `metrics` facade; exporter wiring is the
//!   embedding application's concern
//! - Low-overhead updates, called from inside the maintenance pass

use metrics::{counter, gauge};

pub fn record_pool_size(active: usize, standby: usize) {
    gauge!("pool_active_connections").set(active as f64);
    gauge!("pool_standby_connections").set(standby as f64);
}

pub fn record_connect_failure() {
    counter!("pool_connect_failures_total").increment(1);
}

pub fn record_eviction() {
    counter!("pool_evictions_total").increment(1);
}

pub fn record_rebalance_swap() {
    counter!("pool_rebalance_swaps_total").increment(1);
}
