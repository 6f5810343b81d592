//! Maintenance subsystem.
//!
//! # Data Flow
//! ```text
//! Jittered timer (coordinator.rs)
//!     → pool.maintain_once()
//!         → heartbeat dispatch
//!         → failure repair
//!         → load rebalancing (once per full window)
//!     → loop, until the shutdown broadcast fires
//! ```
//!
//! # Design Decisions
//! - The coordinator owns cadence and cancellation, nothing else; every
//!   pool decision lives in the pool itself
//! - Interval jitter is per-iteration, not a fixed offset

pub mod coordinator;

pub use coordinator::MaintenanceCoordinator;
