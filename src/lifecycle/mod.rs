//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Application teardown
//!     → Shutdown::trigger()
//!     → maintenance loop exits after its current pass
//!     → pool.close() drains and closes every connection
//! ```
//!
//! # Design Decisions
//! - One broadcast channel, many subscribers; the trigger is idempotent
//! - Nothing is interrupted mid-I/O, tasks exit at their next check

pub mod shutdown;

pub use shutdown::Shutdown;
