//! Self-updating configuration values.
//!
//! A [`DynamicValue`] is a read-through projection over a [`ConfigStore`]:
//! every `get` loads the current snapshot and projects again, so a handle
//! kept for the life of the process always sees the latest reload. Nothing
//! is cached.

use std::fmt;
use std::sync::Arc;

use crate::config::store::ConfigStore;

/// A configuration value that may change between calls.
pub trait Value<T> {
    /// Current value.
    fn get(&self) -> T;
}

/// Any `Fn() -> T` is a value; handy for ad-hoc sources.
impl<T, F> Value<T> for F
where
    F: Fn() -> T,
{
    fn get(&self) -> T {
        self()
    }
}

/// A value fixed at construction that never follows reloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticValue<T> {
    pub value: T,
}

impl<T> StaticValue<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone> Value<T> for StaticValue<T> {
    fn get(&self) -> T {
        self.value.clone()
    }
}

/// Projection of one field out of the store's current snapshot.
pub struct DynamicValue<S, T> {
    store: Arc<ConfigStore<S>>,
    project: Arc<dyn Fn(&S) -> T + Send + Sync>,
}

impl<S, T> DynamicValue<S, T> {
    pub fn new<F>(store: Arc<ConfigStore<S>>, project: F) -> Self
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self {
            store,
            project: Arc::new(project),
        }
    }
}

impl<S, T> Value<T> for DynamicValue<S, T> {
    fn get(&self) -> T {
        let snapshot = self.store.load();
        (self.project)(&snapshot)
    }
}

impl<S, T> Clone for DynamicValue<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            project: Arc::clone(&self.project),
        }
    }
}

impl<S, T> fmt::Debug for DynamicValue<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicValue")
            .field("source", &self.store.source())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{EtcdConfig, RouterConfig};

    fn store_with(conn_count: i64) -> Arc<ConfigStore<RouterConfig>> {
        let config = RouterConfig { conn_count, ..Default::default() };
        Arc::new(ConfigStore::new(config, None))
    }

    #[test]
    fn static_value_ignores_reloads() {
        let store = store_with(5);
        let fixed = StaticValue::new(12);
        let live = store.conn_count();

        store.replace(RouterConfig { conn_count: 8, ..Default::default() });

        assert_eq!(fixed.get(), 12);
        assert_eq!(live.get(), 8);
    }

    #[test]
    fn every_clone_follows_the_store() {
        let store = Arc::new(ConfigStore::new(RouterConfig::default(), None));
        let first = store.etcd_configs();
        let second = first.clone();

        store.replace(RouterConfig {
            conn_count: 0,
            etcd_configs: vec![EtcdConfig::new("a", "a:2379")],
        });

        assert_eq!(first.get(), second.get());
        assert_eq!(second.get().len(), 1);
    }

    #[test]
    fn closures_are_values() {
        let store = store_with(3);
        let doubled = {
            let store = Arc::clone(&store);
            move || store.load().conn_count * 2
        };
        assert_eq!(doubled.get(), 6);
    }

    fn read_through(value: &impl Value<i64>) -> i64 {
        value.get()
    }

    #[test]
    fn static_and_dynamic_share_the_trait() {
        let store = store_with(4);
        assert_eq!(read_through(&StaticValue::new(1)), 1);
        assert_eq!(read_through(&store.conn_count()), 4);
    }
}
