//! Configuration schema definitions.
//!
//! This module defines the configuration snapshot served by the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
///
/// One value of this type is a complete snapshot: a reload builds a new one
/// and swaps it in whole, fields are never patched in place.
///
/// `connCount` is required so a half-written file fails to decode instead
/// of producing a snapshot with defaults filled in.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Number of connections the router keeps open.
    pub conn_count: i64,

    /// etcd clusters, in declaration order.
    #[serde(default)]
    pub etcd_configs: Vec<EtcdConfig>,
}

/// Connection settings for a single etcd cluster.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EtcdConfig {
    /// Cluster identifier for logging.
    pub name: String,

    /// Endpoint address (e.g., "10.0.0.1:2379").
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl EtcdConfig {
    /// Create an unauthenticated cluster entry.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: None,
            password: None,
        }
    }

    /// Attach credentials to this entry.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

impl std::fmt::Display for EtcdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Password stays out of log lines.
        match &self.username {
            Some(user) => write!(f, "{} ({}@{})", self.name, user, self.host),
            None => write!(f, "{} ({})", self.name, self.host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_list_defaults_to_empty() {
        let config: RouterConfig = serde_yaml::from_str("connCount: 3\n").unwrap();
        assert_eq!(config.conn_count, 3);
        assert!(config.etcd_configs.is_empty());
    }

    #[test]
    fn conn_count_is_required() {
        let result = serde_yaml::from_str::<RouterConfig>("etcdConfigs: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn display_hides_password() {
        let etcd = EtcdConfig::new("main", "10.0.0.1:2379").with_credentials("root", "hunter2");
        let shown = etcd.to_string();
        assert_eq!(shown, "main (root@10.0.0.1:2379)");
        assert!(!shown.contains("hunter2"));
    }
}
