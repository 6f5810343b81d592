//! Connection pool subsystem.
//!
//! # Data Flow
//! ```text
//! set_host_list → full rebuild (random subset, active filled first)
//! select_for_send → round-robin over the published active snapshot
//! maintain_once (one coordinator tick):
//!     → heartbeat probes to every live member (load.rs collects samples)
//!     → repair: evict dead members, reconnect, promote, retry bad hosts
//!     → rebalance: swap the single worst-active/best-standby pair,
//!       discard the probe pool, top back up to target
//! ```
//!
//! # Design Decisions
//! - Active and standby are explicit sets: standby exists only to sample
//!   load and serve as promotion stock, rebuilt every load window
//! - Selection never takes the topology lock; the active set is an
//!   arc-swapped snapshot with an atomic round-robin cursor
//! - Bad-host counters have no time decay; they clear on reconnect only

pub mod load;
pub mod manager;
pub mod member;

pub use load::{LoadTracker, NO_OPINION};
pub use manager::{ConnectionPool, PoolSnapshot};
pub use member::Member;
