//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_reloads_total` (counter): reload attempts by `trigger` and `outcome`
//! - `config_generation` (gauge): snapshots installed since startup
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// What caused a reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    /// Filesystem change notification.
    Watch,
    /// SIGHUP.
    Signal,
    /// Direct call from application code.
    Manual,
}

impl ReloadTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadTrigger::Watch => "watch",
            ReloadTrigger::Signal => "signal",
            ReloadTrigger::Manual => "manual",
        }
    }
}

/// Install the Prometheus exporter serving `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

/// Record the outcome of one reload attempt.
pub fn record_reload(trigger: ReloadTrigger, succeeded: bool, generation: u64) {
    let outcome = if succeeded { "success" } else { "failure" };
    metrics::counter!(
        "config_reloads_total",
        "trigger" => trigger.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::gauge!("config_generation").set(generation as f64);
}
