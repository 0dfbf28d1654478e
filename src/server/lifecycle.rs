//! Connection lifecycle hooks
//!
//! Start, connect, message, disconnect and stop events all pass through
//! `Lifecycle`, which owns the shared registry for the life of the server.

use std::net::SocketAddr;

use log::info;

use crate::client::{ClientHandle, ConnectionId, ConnectionRecord, Registry, SharedRegistry};
use crate::protocol::responses;
use crate::protocol::{CommandStatus, handle_command, parse_command};
use crate::utils::logging::log_connection;

#[derive(Debug, Clone)]
pub struct Lifecycle {
    registry: SharedRegistry,
    max_clients: usize,
}

impl Lifecycle {
    /// Creates the registry for a freshly started server that admits at most
    /// `max_clients` connections at once.
    pub fn on_start(max_clients: usize) -> Self {
        info!("Server has started");
        info!("Clients connected to server: 0");
        Self {
            registry: Registry::shared(),
            max_clients,
        }
    }

    pub async fn active_count(&self) -> usize {
        self.registry.lock().await.active_count()
    }

    /// Enters a new connection into the registry and greets it with the
    /// command list. Returns `None`, leaving the registry untouched, when the
    /// server is full. The capacity check and the insert share one lock.
    pub async fn on_connect(
        &self,
        handle: ClientHandle,
        addr: SocketAddr,
    ) -> Option<ConnectionId> {
        let (id, active) = {
            let mut registry = self.registry.lock().await;
            if registry.active_count() >= self.max_clients {
                return None;
            }
            let id = registry.connect(handle.clone());
            (id, registry.active_count())
        };

        handle.send_line(responses::HELP_TEXT);
        log_connection(id, addr, active);
        Some(id)
    }

    /// Runs one received line through the dispatcher and sends the results.
    pub async fn on_message(&self, id: ConnectionId, line: &str) -> CommandStatus {
        let command = parse_command(line);
        let result = handle_command(&self.registry, id, &command).await;
        result.deliver();
        result.status
    }

    /// Removes the connection and releases its name. Calling this for an id
    /// that is already gone does nothing.
    pub async fn on_disconnect(&self, id: ConnectionId) -> Option<ConnectionRecord> {
        let (record, active) = {
            let mut registry = self.registry.lock().await;
            let record = registry.disconnect(id);
            (record, registry.active_count())
        };

        let record = record?;
        info!(
            "Client {} ({}) disconnected; clients connected to server: {}",
            id,
            record.name().unwrap_or("unregistered"),
            active
        );
        Some(record)
    }

    /// Sends the shutdown token to every connection, then empties the registry.
    pub async fn on_stop(&self) {
        let records = self.registry.lock().await.clear();

        for record in &records {
            record.handle().send_line(responses::SHUTDOWN_TOKEN);
            record.handle().close();
        }

        info!("Server has stopped ({} connections closed)", records.len());
    }
}
