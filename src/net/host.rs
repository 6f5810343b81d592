//! Proxy host addressing and host-set utilities.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One ingestion-proxy endpoint, compared and hashed by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostAddress {
    pub host: String,
    pub port: u16,
}

impl HostAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Error parsing a `host:port` string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid host address '{0}', expected host:port")]
pub struct ParseHostError(String);

impl FromStr for HostAddress {
    type Err = ParseHostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseHostError(s.to_string()))?;
        if host.is_empty() {
            return Err(ParseHostError(s.to_string()));
        }
        let port = port.parse().map_err(|_| ParseHostError(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}

/// Pick up to `n` hosts uniformly at random, without repetition.
/// Returns all of them (shuffled) when the list is shorter than `n`.
pub fn pick_random(hosts: &[HostAddress], n: usize) -> Vec<HostAddress> {
    let mut shuffled = hosts.to_vec();
    shuffled.shuffle(&mut rand::thread_rng());
    shuffled.truncate(n);
    shuffled
}

/// Drop duplicate hosts, preserving first-seen order.
pub fn dedup_hosts(hosts: Vec<HostAddress>) -> Vec<HostAddress> {
    let mut seen = HashSet::new();
    hosts.into_iter().filter(|h| seen.insert(h.clone())).collect()
}
