//! Error handling
//!
//! Defines error types and handling for the chat server.

pub mod handlers;
pub mod types;

pub use handlers::{error_to_reply, handle_error};
pub use types::*;
