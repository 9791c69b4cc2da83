//! Hot-reloadable router configuration.
//!
//! A [`ConfigStore`] holds the active snapshot behind an atomic pointer; a
//! [`ConfigWatcher`](config::ConfigWatcher) and SIGHUP reload it from disk,
//! and [`Value`] handles read through to whatever is current.

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::{ConfigStore, RouterConfig, StaticValue, Value};
pub use lifecycle::{ConfigRuntime, Shutdown};
