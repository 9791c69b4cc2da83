//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (read & deserialize)
//!     → RouterConfig snapshot (immutable)
//!     → store.rs (atomic swap of Arc<RouterConfig>)
//!     → value.rs (read-through accessors handed to consumers)
//!
//! On change:
//!     watcher.rs detects a write in the parent directory, or SIGHUP arrives
//!     → loader.rs loads the new snapshot
//!     → store.rs swaps it in
//!     → the next Value::get observes it
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; changes require a full reload
//! - A failed reload never touches the active snapshot
//! - Only structural decoding is checked; there is no schema validation

pub mod loader;
pub mod schema;
pub mod store;
pub mod value;
pub mod watcher;

pub use loader::{ConfigError, ConfigFormat};
pub use schema::{EtcdConfig, RouterConfig};
pub use store::ConfigStore;
pub use value::{DynamicValue, StaticValue, Value};
pub use watcher::{ConfigWatcher, WatchError, WatchState};
