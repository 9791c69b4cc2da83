//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config store / watcher / signal handler produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (reload counters, generation gauge)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! Reload failures after startup are never fatal; these two channels are
//! where they surface.

pub mod logging;
pub mod metrics;
