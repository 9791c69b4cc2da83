//! Configuration file watcher for hot reload.
//!
//! # States
//! ```text
//! Idle → Watching: parent directory subscribed
//! Watching → Idle: shutdown received, or the notify channel closed
//! ```
//!
//! The parent directory is watched instead of the file: editors and
//! deployment tools often write a new file and rename it over the old one,
//! which leaves a file-level watch pointing at a dead inode.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{AccessKind, AccessMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::config::store::ConfigStore;
use crate::lifecycle::shutdown::ShutdownListener;
use crate::observability::metrics::{self, ReloadTrigger};

/// Errors that stop the watcher. Reload failures are not among them.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The store has no source file to watch.
    #[error("no config file specified")]
    NoSourceConfigured,

    /// The filesystem subscription could not be created.
    #[error("failed to set up config watch: {0}")]
    Setup(#[from] notify::Error),
}

/// Lifecycle state of a [`ConfigWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Watching,
}

/// Reloads a [`ConfigStore`] every time its source file changes on disk.
pub struct ConfigWatcher<T> {
    store: Arc<ConfigStore<T>>,
    state_tx: watch::Sender<WatchState>,
}

impl<T> ConfigWatcher<T>
where
    T: DeserializeOwned + Default + Send + Sync + 'static,
{
    /// Create a watcher for `store`. Nothing is subscribed until [`run`](Self::run).
    pub fn new(store: Arc<ConfigStore<T>>) -> Self {
        let (state_tx, _) = watch::channel(WatchState::Idle);
        Self { store, state_tx }
    }

    /// Observe state transitions, e.g. to wait until the watch is live.
    pub fn state(&self) -> watch::Receiver<WatchState> {
        self.state_tx.subscribe()
    }

    /// Watch until `shutdown` fires.
    ///
    /// Each create/modify event for the source file triggers one reload
    /// attempt. A failed attempt is logged and the previous snapshot stays
    /// active. Returns once the subscription has been released.
    pub async fn run(self, mut shutdown: ShutdownListener) -> Result<(), WatchError> {
        let source = self.store.source().ok_or(WatchError::NoSourceConfigured)?;
        let (dir, target) = resolve_watch_target(source)?;

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = event_tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        self.state_tx.send_replace(WatchState::Watching);
        tracing::info!(path = %target.display(), dir = %dir.display(), "Config watcher started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Config watcher received shutdown signal, exiting loop");
                    break;
                }
                received = event_rx.recv() => {
                    let Some(res) = received else {
                        tracing::warn!("Config watch channel closed");
                        break;
                    };
                    match res {
                        Ok(event) if is_relevant(&event, &target) => {
                            if event.need_rescan() {
                                tracing::warn!("Watch events were dropped, reloading to resync");
                            } else {
                                tracing::debug!(
                                    kind = ?event.kind,
                                    "Config file change detected, reloading..."
                                );
                            }
                            self.reload().await;
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Watch error"),
                    }
                }
            }
        }

        // Dropping the notify watcher removes the directory subscription.
        drop(watcher);
        self.state_tx.send_replace(WatchState::Idle);
        tracing::info!(path = %target.display(), "Config watcher stopped");
        Ok(())
    }

    async fn reload(&self) {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || store.reload()).await;

        let succeeded = match outcome {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(
                    error = %e,
                    "Failed to reload config. Keeping current configuration."
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Config reload task failed. Keeping current configuration."
                );
                false
            }
        };
        metrics::record_reload(ReloadTrigger::Watch, succeeded, self.store.generation());
    }
}

/// Split the source into the directory to subscribe to and the exact path
/// events will carry for the file.
///
/// The directory is canonicalized so the joined path matches what the OS
/// reports, including when the source was given relative to the cwd.
fn resolve_watch_target(source: &Path) -> Result<(PathBuf, PathBuf), WatchError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| notify::Error::generic("config path has no file name"))?;

    let parent = match source.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let dir = parent.canonicalize().map_err(notify::Error::io)?;
    let target = dir.join(file_name);
    Ok((dir, target))
}

/// Whether `event` may have changed `target`. A rescan flag means the OS
/// dropped events, so any of them could have been for the target.
fn is_relevant(event: &Event, target: &Path) -> bool {
    if event.need_rescan() {
        return true;
    }

    let kind_matches = match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => true,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
        _ => false,
    };
    kind_matches && event.paths.iter().any(|path| path == target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, Flag, ModifyKind, RemoveKind};

    #[test]
    fn resolves_relative_source_against_cwd() {
        let (dir, target) = resolve_watch_target(Path::new("router.yaml")).unwrap();
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        assert_eq!(dir, cwd);
        assert_eq!(target, cwd.join("router.yaml"));
    }

    #[test]
    fn missing_directory_is_a_setup_error() {
        let result = resolve_watch_target(Path::new("/definitely/not/here/router.yaml"));
        assert!(matches!(result, Err(WatchError::Setup(_))));
    }

    #[test]
    fn only_writes_to_target_are_relevant() {
        let target = Path::new("/etc/router/router.yaml");
        let write = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(target.to_path_buf());
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(target.to_path_buf());
        let closed = Event::new(EventKind::Access(AccessKind::Close(AccessMode::Write)))
            .add_path(target.to_path_buf());
        let sibling = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path("/etc/router/other.yaml".into());
        let removed =
            Event::new(EventKind::Remove(RemoveKind::File)).add_path(target.to_path_buf());
        let read = Event::new(EventKind::Access(AccessKind::Read)).add_path(target.to_path_buf());

        assert!(is_relevant(&write, target));
        assert!(is_relevant(&create, target));
        assert!(is_relevant(&closed, target));
        assert!(!is_relevant(&sibling, target));
        assert!(!is_relevant(&removed, target));
        assert!(!is_relevant(&read, target));
    }

    #[test]
    fn rescan_without_paths_is_relevant() {
        let overflow = Event::new(EventKind::Other).set_flag(Flag::Rescan);
        assert!(overflow.paths.is_empty());
        assert!(is_relevant(&overflow, Path::new("/etc/router/router.yaml")));
    }

    #[tokio::test]
    async fn unwatchable_directory_fails_setup() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone").join("router.yaml");
        let initial = crate::config::RouterConfig { conn_count: 7, ..Default::default() };
        let store = Arc::new(ConfigStore::new(initial.clone(), Some(missing)));
        let watcher = ConfigWatcher::new(Arc::clone(&store));
        let state = watcher.state();
        let shutdown = crate::lifecycle::Shutdown::new();

        let result = watcher.run(shutdown.subscribe()).await;

        assert!(matches!(result, Err(WatchError::Setup(_))));
        assert_eq!(*state.borrow(), WatchState::Idle);
        assert_eq!(*store.load(), initial);
        assert_eq!(store.generation(), 0);
    }

    #[tokio::test]
    async fn refuses_to_start_without_source() {
        let store = Arc::new(ConfigStore::new(crate::config::RouterConfig::default(), None));
        let watcher = ConfigWatcher::new(store);
        let state = watcher.state();
        let shutdown = crate::lifecycle::Shutdown::new();

        let result = watcher.run(shutdown.subscribe()).await;

        assert!(matches!(result, Err(WatchError::NoSourceConfigured)));
        assert_eq!(*state.borrow(), WatchState::Idle);
    }
}
