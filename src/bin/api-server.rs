//! Signal Relay webhook server
//!
//! Receives charting-platform alerts and payment webhooks. Configuration comes from the
//! environment (and `.env` when present).

use dotenvy::dotenv;
use signal_relay::config::{get_environment, RelayConfig};
use signal_relay::core::http::start_server;
use signal_relay::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = RelayConfig::from_env()?;
    let port = config.port;

    info!("Starting Signal Relay");
    info!(environment = %get_environment(), "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down webhook server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
