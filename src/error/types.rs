//! Error types
//!
//! Registry and dispatch errors are user-facing: each one becomes a reply to the
//! originating connection and leaves server state untouched. `ChatServerError`
//! only surfaces while starting the server.

use std::io;

use thiserror::Error;

use crate::client::ConnectionId;

/// Registry module errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Name already registered: {0}")]
    NameTaken(String),
    #[error("Invalid name: {0:?}")]
    InvalidName(String),
    #[error("Connection {0} already holds a name")]
    AlreadyRegistered(ConnectionId),
    #[error("Connection not found: {0}")]
    UnknownConnection(ConnectionId),
}

/// Errors produced while dispatching a command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("No such user registered: {0}")]
    UnknownTarget(String),
    #[error("Connection is not registered")]
    NotRegistered,
    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),
}

/// Fatal errors raised while bringing the server up
#[derive(Debug, Error)]
pub enum ChatServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
