//! Module `state`
//!
//! Defines the per-connection identity held by the registry: the assigned id,
//! the registered display name, and the handle used to push lines back to the
//! connection.

use std::fmt;

use log::warn;
use tokio::sync::mpsc;

/// Identity assigned to a connection at connect time.
///
/// Ids come from a counter that only increments, so an id is never handed out
/// twice within one server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a connection has claimed a display name yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unregistered,
    Registered,
}

/// Item queued for a connection's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// One message, written followed by a newline
    Line(String),
    /// Ends the session after everything queued before it has been written
    Close,
}

/// Send capability for a single connection.
///
/// Wraps the sending half of the connection's outbound queue. Sending never
/// blocks, so handles can be used right after releasing the registry lock.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ClientHandle {
    pub fn new(tx: mpsc::UnboundedSender<Outbound>) -> Self {
        Self { tx }
    }

    /// Queues one line for the connection. Returns false if the connection
    /// has already gone away.
    pub fn send_line(&self, text: impl Into<String>) -> bool {
        match self.tx.send(Outbound::Line(text.into())) {
            Ok(()) => true,
            Err(_) => {
                warn!("Dropping message for a connection that already closed");
                false
            }
        }
    }

    /// Asks the connection's session loop to terminate.
    pub fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

/// Represents one connected client as stored in the registry.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    id: ConnectionId,
    name: Option<String>,
    handle: ClientHandle,
}

impl ConnectionRecord {
    /// Creates an unregistered record.
    pub fn new(id: ConnectionId, handle: ClientHandle) -> Self {
        Self {
            id,
            name: None,
            handle,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the registered display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    pub fn state(&self) -> ConnectionState {
        match self.name {
            Some(_) => ConnectionState::Registered,
            None => ConnectionState::Unregistered,
        }
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Only the registry assigns names, so it can keep its name index in step.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}
