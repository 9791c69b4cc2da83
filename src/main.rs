//! Router configuration demo.
//!
//! Loads a config file, keeps it fresh through file watching and SIGHUP,
//! and prints the live values on an interval.
//!
//! ```text
//!   config file ──▶ loader ──▶ ConfigStore ◀── SIGHUP
//!        ▲                        │
//!        └──── watcher ───────────┘
//!                                 ▼
//!                      Value::get() in the printer
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use router_config::config::{EtcdConfig, Value};
use router_config::lifecycle::signals::shutdown_on_signal;
use router_config::lifecycle::ShutdownListener;
use router_config::observability::logging::{init_logging, LogFormat};
use router_config::observability::metrics::init_metrics;
use router_config::{ConfigRuntime, RouterConfig, StaticValue};

#[derive(Parser, Debug)]
#[command(name = "router-config")]
#[command(about = "Hot-reloading router configuration demo", long_about = None)]
struct Args {
    /// Configuration file (YAML, or TOML with a .toml extension).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print this fixed connection count instead of the configured one.
    #[arg(long)]
    static_conn_count: Option<i64>,

    /// Seconds between printed snapshots.
    #[arg(long, default_value_t = 2)]
    print_interval_secs: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.log_format);

    tracing::info!("router-config v0.1.0 starting");

    if let Some(addr) = args.metrics_address {
        init_metrics(addr);
    }

    let runtime = ConfigRuntime::<RouterConfig>::start(args.config)?;
    let store = runtime.store();

    tracing::info!(
        conn_count = store.load().conn_count,
        etcd_clusters = store.load().etcd_configs.len(),
        "Configuration ready"
    );

    let interval = Duration::from_secs(args.print_interval_secs.max(1));
    let etcd_configs = store.etcd_configs();
    let listener = runtime.shutdown_handle().subscribe();
    let printer = match args.static_conn_count {
        Some(fixed) => tokio::spawn(print_config_values(
            listener,
            interval,
            StaticValue::new(fixed),
            etcd_configs,
        )),
        None => tokio::spawn(print_config_values(
            listener,
            interval,
            store.conn_count(),
            etcd_configs,
        )),
    };

    shutdown_on_signal(runtime.shutdown_handle()).await;

    if let Err(e) = printer.await {
        tracing::error!(error = %e, "Config printer task panicked");
    }
    runtime.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn print_config_values(
    mut shutdown: ShutdownListener,
    interval: Duration,
    conn_count: impl Value<i64>,
    etcd_configs: impl Value<Vec<EtcdConfig>>,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for etcd in etcd_configs.get() {
                    println!("ETCDConfig: {}", etcd);
                }
                println!("ConnCount: {}", conn_count.get());
            }
            _ = shutdown.recv() => return,
        }
    }
}
