//! Logging utilities
//!
//! Provides logging setup and per-connection log helpers.

use std::net::SocketAddr;

use env_logger::Env;
use log::{debug, info};

use crate::client::ConnectionId;
use crate::protocol::Command;

/// Setup logging for the server. `RUST_LOG` overrides the default `info` filter.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Log a client connection
pub fn log_connection(id: ConnectionId, client_addr: SocketAddr, active: usize) {
    info!(
        "Client {} connected from {}; clients connected to server: {}",
        id, client_addr, active
    );
}

/// Log a client command
pub fn log_command(id: ConnectionId, command: &Command) {
    debug!("Client {} sent: {:?}", id, command);
}
