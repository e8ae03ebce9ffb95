//! BisonChat server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port
//! bisonchat-server
//!
//! # Explicit address and capacity
//! bisonchat-server --bind 0.0.0.0:8888 --max-connections 30
//! ```

use bisonchat_server::{Server, ServerConfig};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// BisonChat chat server
#[derive(Parser, Debug)]
#[command(name = "bisonchat-server")]
#[command(about = "BisonChat line-protocol chat server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8888")]
    bind: String,

    /// Listen backlog
    #[arg(long, default_value = "2")]
    backlog: u32,

    /// Maximum concurrent connections
    #[arg(long, default_value = "30")]
    max_connections: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("BisonChat server starting");

    let config = ServerConfig {
        bind_address: args.bind,
        backlog: args.backlog,
        max_connections: args.max_connections,
    };

    let server = Server::bind(config)?;

    server.run().await?;

    tracing::info!("server shutdown complete");

    Ok(())
}
