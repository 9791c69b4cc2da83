//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config (fatal on error) → spawn watcher → spawn SIGHUP listener
//!
//! Shutdown (shutdown.rs):
//!     Trigger → watcher unsubscribes, listeners exit → tasks joined
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//!     SIGHUP → Trigger config reload
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownListener};
pub use startup::ConfigRuntime;
