//! Chat protocol implementation
//!
//! Handles command parsing, dispatch, and the fixed reply texts.

pub mod codec;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use codec::{ChatCodec, ChatFrame};
pub use commands::{Command, CommandResult, CommandStatus, Delivery, parse_command};
pub use handlers::handle_command;
pub use parser::split_line;
