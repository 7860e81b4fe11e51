use anyhow::{Context, Result};
use clap::Parser;
use sigrelay_server::{AppState, RelayConfig, TracingEventSink, serve};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Room-scoped WebRTC signaling relay.
#[derive(Parser, Debug)]
#[command(name = "sigrelay", version)]
struct Cli {
    /// TOML file with relay settings. Flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:5000
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    #[arg(long)]
    max_connections: Option<usize>,

    /// Per-peer outbound queue capacity.
    #[arg(long)]
    max_queue_depth: Option<usize>,

    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn relay_config(&self) -> Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::load(path)?,
            None => RelayConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(max) = self.max_connections {
            config.max_connections = max;
        }
        if let Some(depth) = self.max_queue_depth {
            config.max_queue_depth = depth;
        }
        if let Some(secs) = self.idle_timeout_secs {
            config.idle_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = cli.relay_config()?;
    info!("Initializing signaling relay...");

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    let state = AppState::new(config, Arc::new(TracingEventSink));
    serve(listener, state, shutdown_signal()).await
}
