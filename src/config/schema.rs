//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so minimal configs work.

use serde::{Deserialize, Serialize};

/// Number of slots in a load window, and of entries in the default weight
/// table.
pub const DEFAULT_CYCLE: usize = 30;

/// Root configuration for the connection pool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PoolConfig {
    /// Pool sizing.
    pub pool: SizingConfig,

    /// Load-based rebalancing.
    pub balancing: BalancingConfig,

    /// Heartbeat cadence.
    pub heartbeat: HeartbeatConfig,
}

/// Pool sizing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Number of connections eligible for sends.
    pub active_connections: usize,

    /// Extra standby connections kept for load probing when rebalancing is
    /// enabled, capped by how many distinct hosts the fleet offers.
    pub standby_margin: usize,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            active_connections: 3,
            standby_margin: 4,
        }
    }
}

/// Load-based rebalancing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancingConfig {
    /// Minimum weighted-load gap between the busiest active connection and
    /// the idlest standby one before a swap happens. 0 disables rebalancing
    /// (and the standby pool) entirely.
    pub load_threshold: u32,

    /// Number of maintenance ticks one load window spans.
    pub cycle: usize,

    /// Per-slot sample weights, oldest to newest. Must have `cycle` entries
    /// and never decrease, so recent samples dominate the average.
    pub weights: Vec<u32>,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            load_threshold: 200,
            cycle: DEFAULT_CYCLE,
            weights: default_weights(),
        }
    }
}

/// Heartbeat cadence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Lower jitter bound between maintenance passes, in seconds.
    pub interval_min_secs: u64,

    /// Upper jitter bound between maintenance passes, in seconds.
    pub interval_max_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_min_secs: 17,
            interval_max_secs: 37,
        }
    }
}

fn default_weights() -> Vec<u32> {
    let mut weights = Vec::with_capacity(DEFAULT_CYCLE);
    for base in [1u32, 2, 3, 6, 12] {
        weights.extend(std::iter::repeat(base).take(5));
    }
    weights.extend([48, 96, 192, 384, 1000]);
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = PoolConfig::default();
        assert_eq!(config.pool.active_connections, 3);
        assert_eq!(config.pool.standby_margin, 4);
        assert_eq!(config.balancing.cycle, DEFAULT_CYCLE);
        assert_eq!(config.balancing.weights.len(), DEFAULT_CYCLE);
        assert_eq!(config.heartbeat.interval_min_secs, 17);
        assert_eq!(config.heartbeat.interval_max_secs, 37);
    }

    #[test]
    fn default_weights_never_decrease() {
        let weights = default_weights();
        assert_eq!(weights.first(), Some(&1));
        assert_eq!(weights.last(), Some(&1000));
        assert!(weights.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: PoolConfig = toml::from_str(
            r#"
            [pool]
            active_connections = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.pool.active_connections, 5);
        assert_eq!(config.pool.standby_margin, 4);
        assert_eq!(config.balancing.weights.len(), DEFAULT_CYCLE);
    }
}
