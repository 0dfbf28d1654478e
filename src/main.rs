//! RAX Chat Server - Entry Point
//!
//! A multi-user line-oriented chat hub: register a name, then broadcast,
//! message a single user, or list who is online.

use log::{error, info};

use rax_chat_server::error::handle_error;
use rax_chat_server::utils::setup_logging;
use rax_chat_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (RUST_LOG overrides the default level)
    setup_logging();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Launching chat server...");

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            handle_error(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run_until(shutdown_signal()).await {
        handle_error(&e);
        std::process::exit(1);
    }
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed the server
/// keeps running until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
