//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → structured tracing events (inline, via the tracing macros)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → whatever subscriber/exporter the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a tracing subscriber or metrics exporter
//! - Metrics are cheap (atomic updates behind the facade)

pub mod metrics;
