//! Atomically swappable holder of the active configuration snapshot.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::de::DeserializeOwned;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{EtcdConfig, RouterConfig};
use crate::config::value::DynamicValue;

/// Holds the current configuration snapshot and the file it came from.
///
/// Reads go through [`ArcSwap`], so `load` and `replace` never take a lock and
/// a reader always gets one complete snapshot. Share the store by wrapping it
/// in an `Arc`; there is no process-wide instance.
pub struct ConfigStore<T> {
    /// Source file, fixed at construction. `None` disables reloading.
    source: Option<PathBuf>,
    current: ArcSwap<T>,
    /// Number of snapshots installed after the initial one.
    generation: AtomicU64,
    /// Serializes `reload` so the call that reads the file last installs last.
    reload_lock: Mutex<()>,
}

impl<T> ConfigStore<T> {
    /// Create a store around an already decoded snapshot.
    pub fn new(initial: T, source: Option<PathBuf>) -> Self {
        Self {
            source,
            current: ArcSwap::from_pointee(initial),
            generation: AtomicU64::new(0),
            reload_lock: Mutex::new(()),
        }
    }

    /// The currently active snapshot.
    pub fn load(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Install a new snapshot. Concurrent readers see either the old or the
    /// new value in full.
    pub fn replace(&self, snapshot: T) {
        self.current.store(Arc::new(snapshot));
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Path of the configuration file backing this store, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// How many times `replace` has completed.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Build a read-through accessor projecting one field of the snapshot.
    pub fn value<U, F>(self: &Arc<Self>, project: F) -> DynamicValue<T, U>
    where
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        DynamicValue::new(Arc::clone(self), project)
    }
}

impl<T: DeserializeOwned + Default> ConfigStore<T> {
    /// Perform the startup load.
    ///
    /// With no path the store starts from `T::default()` and every later
    /// reload fails with [`ConfigError::NoSourceConfigured`].
    pub fn open(source: Option<PathBuf>) -> Result<Self, ConfigError> {
        let initial = match &source {
            Some(path) => load_config(path)?,
            None => T::default(),
        };

        if let Some(path) = &source {
            tracing::info!(path = %path.display(), "Configuration loaded");
        } else {
            tracing::warn!("No config file given, running with defaults");
        }

        Ok(Self::new(initial, source))
    }

    /// Re-read the source file and install the result.
    ///
    /// On any error the current snapshot is left untouched. Blocks on file
    /// I/O; readers are never blocked by it.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let path = self.source.as_deref().ok_or(ConfigError::NoSourceConfigured)?;

        // The guarded unit is `()`, so a poisoned lock carries no broken state.
        let _guard = self.reload_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let snapshot = load_config(path)?;
        self.replace(snapshot);

        tracing::info!(
            path = %path.display(),
            generation = self.generation(),
            "Configuration reloaded"
        );
        Ok(())
    }
}

impl ConfigStore<RouterConfig> {
    /// Self-updating connection count.
    pub fn conn_count(self: &Arc<Self>) -> DynamicValue<RouterConfig, i64> {
        self.value(|config| config.conn_count)
    }

    /// Self-updating list of etcd clusters.
    pub fn etcd_configs(self: &Arc<Self>) -> DynamicValue<RouterConfig, Vec<EtcdConfig>> {
        self.value(|config| config.etcd_configs.clone())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ConfigStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("source", &self.source)
            .field("current", &self.load())
            .field("generation", &self.generation())
            .finish()
    }
}
