//! Client-side connection pool for a message-ingestion proxy fleet.
//!
//! Maintains active and standby connections against an externally supplied
//! host list, routes sends round-robin over the active set, and rebalances
//! the pool from server-reported load gathered over periodic heartbeats.
//! Host failures are absorbed and repaired by a background maintenance task;
//! the send path only ever sees "here is a ready connection" or "none right
//! now".

pub mod config;
pub mod lifecycle;
pub mod maintenance;
pub mod net;
pub mod observability;
pub mod pool;

pub use config::schema::PoolConfig;
pub use lifecycle::Shutdown;
pub use maintenance::MaintenanceCoordinator;
pub use net::{Connection, ConnectionId, Connector, HostAddress};
pub use pool::{ConnectionPool, Member, PoolSnapshot};
