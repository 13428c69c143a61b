//! HTTP API entry point for EcoTrak

use clap::Parser;
use shared::{logging, process_info, ProcessId};
use std::net::SocketAddr;

use tracker::{BackendArgs, Tracker, TrackerConfig};
use webserver::{WebServer, WebServerError, WebServerResult};

/// EcoTrak HTTP API
#[derive(Parser, Debug)]
#[command(name = "ecotrak-web")]
#[command(about = "HTTP API for registering and dispatching recyclable material")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the HTTP server
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    backend: BackendArgs,
}

#[tokio::main]
async fn main() -> WebServerResult<()> {
    let args = Args::parse();

    // Initialize process ID singleton for webserver
    ProcessId::init_webserver();
    logging::init_tracing_with_level(Some(&args.log_level));

    let http_addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| WebServerError::ServerStartup(format!("Invalid bind address: {}", e)))?;

    let config = TrackerConfig::from_env(&args.backend)?;
    logging::log_startup(ProcessId::current(), &format!("ecotrak-web ({} backend)", config.kind()));

    let (tracker, handle) = Tracker::new(config.build_adapter(), config.weight_mode);
    let tracker_shutdown = tracker.get_shutdown_sender();
    let worker = tracker.start().await?;

    process_info!(ProcessId::current(), "🌐 Starting HTTP API on {}", http_addr);
    let webserver = WebServer::new(http_addr, handle, config.kind().to_string());
    webserver.run().await?;

    let _ = tracker_shutdown.send(()).await;
    if let Err(e) = worker.await {
        logging::log_error(ProcessId::current(), "Tracker task", &e);
    }

    logging::log_success(ProcessId::current(), "WebServer stopped gracefully");
    Ok(())
}
