//! Standalone API server binary
//!
//! Usage: cargo run -p tictac-web --bin tictac-server -- --api-keys key1,key2

use clap::Parser;
use tictac_web::{ServerArgs, WebServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tictac_web::init_logging();

    let args = ServerArgs::parse();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        host = config.host(),
        port = config.port(),
        api_keys = config.api_keys().len(),
        id_scheme = ?config.id_scheme(),
        restricted = config.store_config().restricted,
        chain_next_match = config.store_config().chain_next_match,
        "starting tic-tac-toe server"
    );

    let server = WebServer::new(config)?;
    let handle = server.start().await?;

    println!("\nServer running at http://{}", handle.address());
    println!("   Press Ctrl+C to stop\n");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down server");
    handle.shutdown().await?;

    Ok(())
}
