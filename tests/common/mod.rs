//! Shared utilities for the hot-reload integration tests.

use std::fs;
use std::path::Path;
use std::time::Duration;

use router_config::config::loader::encode_config;
use router_config::config::{ConfigFormat, EtcdConfig, RouterConfig};

/// Build a snapshot whose clusters are named after `names`.
pub fn snapshot(conn_count: i64, names: &[&str]) -> RouterConfig {
    RouterConfig {
        conn_count,
        etcd_configs: names
            .iter()
            .map(|name| EtcdConfig::new(*name, format!("{}.etcd.internal:2379", name)))
            .collect(),
    }
}

/// Write `config` in place, in the format implied by the extension.
pub fn write_config(path: &Path, config: &RouterConfig) {
    fs::write(path, encode(path, config)).unwrap();
}

/// Write to a temporary sibling and rename it over `path`, like most editors.
pub fn replace_config(path: &Path, config: &RouterConfig) {
    replace_raw(path, &encode(path, config));
}

fn encode(path: &Path, config: &RouterConfig) -> String {
    encode_config(config, ConfigFormat::from_path(path)).unwrap()
}

/// Atomically swap raw text into `path`, so no reader sees a partial file.
pub fn replace_raw(path: &Path, text: &str) {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text).unwrap();
    fs::rename(&tmp, path).unwrap();
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
