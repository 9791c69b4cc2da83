//! OS signal handling.
//!
//! - SIGHUP → config reload (out-of-band trigger, same path as the watcher)
//! - SIGTERM / Ctrl-C → shutdown
//!
//! Uses Tokio's signal handling, so handlers run as ordinary tasks.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::loader::ConfigError;
use crate::config::store::ConfigStore;
use crate::lifecycle::shutdown::{Shutdown, ShutdownListener};
use crate::observability::metrics::{self, ReloadTrigger};

/// Reload the store on behalf of an external trigger and report the outcome.
///
/// Blocks on file I/O; call from a blocking context. Failures are logged and
/// returned, and the current snapshot stays in place.
pub fn trigger_reload<T>(store: &ConfigStore<T>, trigger: ReloadTrigger) -> Result<(), ConfigError>
where
    T: DeserializeOwned + Default,
{
    let result = store.reload();
    if let Err(e) = &result {
        tracing::error!(trigger = trigger.as_str(), error = %e, "Config reload failed");
    }
    metrics::record_reload(trigger, result.is_ok(), store.generation());
    result
}

/// Reload `store` on every SIGHUP until `shutdown` fires.
#[cfg(unix)]
pub async fn reload_on_hangup<T>(
    store: Arc<ConfigStore<T>>,
    mut shutdown: ShutdownListener,
) -> std::io::Result<()>
where
    T: DeserializeOwned + Default + Send + Sync + 'static,
{
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    tracing::info!("Listening for SIGHUP to reload configuration");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                tracing::info!("Received SIGHUP");
                let store = Arc::clone(&store);
                let reload = tokio::task::spawn_blocking(move || {
                    trigger_reload(&store, ReloadTrigger::Signal)
                });
                // Reload errors are already reported by trigger_reload.
                if let Err(e) = reload.await {
                    tracing::error!(error = %e, "SIGHUP reload task panicked");
                }
            }
        }
    }
    Ok(())
}

/// SIGHUP does not exist here; only wait for shutdown.
#[cfg(not(unix))]
pub async fn reload_on_hangup<T>(
    _store: Arc<ConfigStore<T>>,
    mut shutdown: ShutdownListener,
) -> std::io::Result<()>
where
    T: DeserializeOwned + Default + Send + Sync + 'static,
{
    tracing::warn!("SIGHUP reload is not supported on this platform");
    shutdown.recv().await;
    Ok(())
}

/// Trigger `shutdown` on Ctrl-C or SIGTERM.
pub async fn shutdown_on_signal(shutdown: &Shutdown) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
    shutdown.trigger();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use std::fs;

    #[test]
    fn trigger_reload_installs_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.yaml");
        fs::write(&path, "connCount: 1\n").unwrap();
        let store = ConfigStore::<RouterConfig>::open(Some(path.clone())).unwrap();

        fs::write(&path, "connCount: 2\n").unwrap();
        trigger_reload(&store, ReloadTrigger::Manual).unwrap();

        assert_eq!(store.load().conn_count, 2);
    }

    #[test]
    fn trigger_reload_without_source_reports_error() {
        let store = ConfigStore::<RouterConfig>::new(RouterConfig::default(), None);
        let result = trigger_reload(&store, ReloadTrigger::Signal);
        assert!(matches!(result, Err(ConfigError::NoSourceConfigured)));
        assert_eq!(store.generation(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hangup_listener_exits_on_shutdown() {
        let store = Arc::new(ConfigStore::<RouterConfig>::new(RouterConfig::default(), None));
        let shutdown = Shutdown::new();
        let task = tokio::spawn(reload_on_hangup(store, shutdown.subscribe()));

        shutdown.trigger();
        let joined = tokio::time::timeout(std::time::Duration::from_secs(2), task).await;
        assert!(matches!(joined, Ok(Ok(Ok(())))));
    }
}
