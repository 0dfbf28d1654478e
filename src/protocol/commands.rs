//! Module `commands`
//!
//! Defines the chat commands a client can send, the parse step that turns a
//! raw line into one, and the result type returned by the dispatcher.

use crate::client::ClientHandle;
use crate::protocol::parser::split_line;

/// Prefix of the direct-message verb, `m-<name>`
pub const DIRECT_PREFIX: &str = "m-";

/// Represents a chat command parsed from client input.
///
/// Verbs are matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `reg <name>`
    Register(String),
    /// `active`, list registered names
    Active,
    /// `all <text>`, broadcast to every connection
    All(String),
    /// `m-<name> <text>`
    Direct { target: String, text: String },
    Quit,
    Help,
    /// Any other verb, kept as sent
    Unknown(String),
}

/// Represents the outcome of executing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}

/// One message addressed to one connection.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub to: ClientHandle,
    pub text: String,
}

/// Struct encapsulating the full result of a command execution.
///
/// Deliveries are collected while the registry is locked and sent afterwards.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub deliveries: Vec<Delivery>,
}

impl CommandResult {
    pub fn reply(to: ClientHandle, text: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Continue,
            deliveries: vec![Delivery {
                to,
                text: text.into(),
            }],
        }
    }

    pub fn close() -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            deliveries: Vec::new(),
        }
    }

    /// Pushes every collected message onto its connection's queue.
    pub fn deliver(&self) {
        for delivery in &self.deliveries {
            delivery.to.send_line(delivery.text.as_str());
        }
    }
}

/// Parses a raw line received from a client into the `Command` enum.
pub fn parse_command(raw: &str) -> Command {
    let (action, rest) = split_line(raw.trim());

    match action {
        "reg" => Command::Register(rest.to_string()),
        "active" => Command::Active,
        "all" => Command::All(rest.to_string()),
        "quit" => Command::Quit,
        "help" => Command::Help,
        _ => match action.strip_prefix(DIRECT_PREFIX) {
            Some(target) => Command::Direct {
                target: target.to_string(),
                text: rest.to_string(),
            },
            None => Command::Unknown(action.to_string()),
        },
    }
}
