//! Startup orchestration.
//!
//! Ordered: initial config load first (fail fast, there is nothing to run
//! with otherwise), then the background reload paths. A watcher that cannot
//! subscribe only loses auto-reload; the process keeps the loaded config.

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::config::loader::ConfigError;
use crate::config::store::ConfigStore;
use crate::config::watcher::{ConfigWatcher, WatchError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::reload_on_hangup;

/// A loaded store plus the tasks keeping it fresh.
pub struct ConfigRuntime<T> {
    store: Arc<ConfigStore<T>>,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<()>>,
}

impl<T> ConfigRuntime<T>
where
    T: DeserializeOwned + Default + Send + Sync + 'static,
{
    /// Load the configuration and spawn the watcher and SIGHUP listener.
    ///
    /// Must be called inside a Tokio runtime. Only the initial load can fail.
    pub fn start(source: Option<PathBuf>) -> Result<Self, ConfigError> {
        let store = Arc::new(ConfigStore::open(source)?);
        let shutdown = Shutdown::new();
        let mut tasks = Vec::new();

        let watcher = ConfigWatcher::new(Arc::clone(&store));
        let listener = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            match watcher.run(listener).await {
                Ok(()) => {}
                Err(WatchError::NoSourceConfigured) => {
                    tracing::info!("No config file to watch, hot reload disabled");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Config watcher failed, continuing without hot reload"
                    );
                }
            }
        }));

        let hangup_store = Arc::clone(&store);
        let listener = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = reload_on_hangup(hangup_store, listener).await {
                tracing::error!(error = %e, "Failed to install SIGHUP handler");
            }
        }));

        Ok(Self { store, shutdown, tasks })
    }

    pub fn store(&self) -> &Arc<ConfigStore<T>> {
        &self.store
    }

    /// Coordinator shared with any extra tasks the application spawns.
    pub fn shutdown_handle(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Stop the background tasks and wait for them to release their resources.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Background config task panicked");
            }
        }
        tracing::info!("Config runtime stopped");
    }
}
