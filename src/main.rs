//! Route server.
//!
//! Serves a TOML route table over HTTP and answers every request with the
//! route it resolves to.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ routing engine ──▶ lookup outcome
//!     ◀────────────── response    ◀──────────────────────────┘
//!
//!     routes.toml ──▶ config loader ──▶ Router::from_config ──▶ ArcSwap<Router>
//!          ▲                                                        ▲
//!          └──── watcher (notify) ──── mpsc ──── reloader ──────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use route_engine::config::watcher::ConfigWatcher;
use route_engine::config::{load_config, AppConfig};
use route_engine::observability::{logging, metrics};
use route_engine::{HttpServer, Router};

#[derive(Parser, Debug)]
#[command(name = "route-server", version, about = "Serve a route table over HTTP")]
struct Args {
    /// Route configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the route table when the config file changes.
    #[arg(long)]
    watch: bool,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability);
    tracing::info!("route-server v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let routes = Router::from_config(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, routes);

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            server.spawn_reloader(updates);
            Some(watcher.run()?)
        }
        _ => None,
    };

    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
