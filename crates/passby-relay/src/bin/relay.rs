//! Passby Token Relay
//!
//! In-memory HTTP relay for exchanging ranging handshake tokens by room.
//!
//! # Usage
//!
//! ```bash
//! # Defaults (0.0.0.0:3000, 30 minute TTL)
//! passby-relay
//!
//! # Explicit listener
//! PORT=8080 HOST=127.0.0.1 passby-relay
//!
//! # Config file plus a background sweep every minute
//! passby-relay --config /etc/passby/relay.toml --sweep-interval-secs 60
//! ```

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use passby_core::RelayConfig;
use passby_relay::{RelayServer, SERVICE_VERSION};

#[derive(Parser, Debug)]
#[command(name = "passby-relay")]
#[command(about = "Room-scoped token relay for passby ranging handshakes")]
#[command(version)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, env = "PASSBY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Bind address
    #[arg(long, env = "HOST")]
    host: Option<IpAddr>,

    /// Token time-to-live in seconds
    #[arg(long)]
    ttl_secs: Option<u64>,

    /// Background sweep period in seconds (0 disables)
    #[arg(long)]
    sweep_interval_secs: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print a sample config file and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn resolve_config(&self) -> anyhow::Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::load_from(path)
                .with_context(|| format!("failed to load config from {:?}", path))?,
            None => RelayConfig::load(),
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = self.host {
            config.server.bind = host;
        }
        if let Some(ttl) = self.ttl_secs {
            config.tokens.ttl_secs = ttl;
        }
        if let Some(interval) = self.sweep_interval_secs {
            config.tokens.sweep_interval_secs = interval;
        }

        Ok(config)
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", RelayConfig::sample());
        return Ok(());
    }

    init_logging(args.json_logs);

    let config = args.resolve_config()?;

    info!("Starting passby relay v{}", SERVICE_VERSION);
    info!("Using in-memory token store (no persistence)");

    let addr = config.socket_addr();
    let server = RelayServer::new(config);
    server
        .run()
        .await
        .with_context(|| format!("relay server on {} failed", addr))?;

    Ok(())
}
