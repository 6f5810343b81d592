//! Network seam subsystem.
//!
//! # Data Flow
//! ```text
//! Directory refresher supplies HostAddress values (host.rs)
//!     → pool opens sessions through Connector (conn.rs)
//!     → sessions drive lifecycle/heartbeats through Connection
//!     → heartbeat acks flow back keyed by ConnectionId
//! ```
//!
//! # Design Decisions
//! - The transport is opaque: the pool holds capabilities, not sockets
//! - Host identity is by value (host, port), never by connection
//! - Connection IDs are process-unique, minted once per session

pub mod conn;
pub mod host;

pub use conn::{Connection, ConnectionId, Connector};
pub use host::{dedup_hosts, pick_random, HostAddress, ParseHostError};
