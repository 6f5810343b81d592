//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PoolConfig (validated, immutable)
//!     → owned by the pool for its lifetime
//!
//! Directory payload (JSON)
//!     → hostlist.rs (parse & dedup)
//!     → pool.set_host_list(...)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; host-list changes flow through
//!   `set_host_list`, not through config reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod hostlist;
pub mod loader;
pub mod schema;
pub mod validation;

pub use hostlist::parse_host_list;
pub use loader::{load_config, ConfigError};
pub use schema::{BalancingConfig, HeartbeatConfig, PoolConfig, SizingConfig};
pub use validation::{validate_config, ValidationError};
