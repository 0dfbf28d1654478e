//! Error handlers
//!
//! Maps errors to the text sent back over the wire and logs fatal ones.

use log::error;

use crate::error::types::{ChatError, ChatServerError, RegistryError};
use crate::protocol::responses;

/// Handle a chat server error
pub fn handle_error(err: &ChatServerError) {
    error!("Chat Server Error: {}", err);
}

/// Convert a user-facing error to the reply sent to the originating connection
pub fn error_to_reply(err: &ChatError) -> &'static str {
    match err {
        ChatError::Registry(RegistryError::NameTaken(_)) => responses::NAME_TAKEN,
        ChatError::Registry(RegistryError::InvalidName(_)) => responses::INVALID_NAME,
        ChatError::Registry(RegistryError::AlreadyRegistered(_)) => responses::WRONG_COMMAND,
        ChatError::Registry(RegistryError::UnknownConnection(_)) => responses::NOT_REGISTERED,
        ChatError::UnknownTarget(_) => responses::NO_SUCH_USER,
        ChatError::NotRegistered => responses::NOT_REGISTERED,
        ChatError::UnknownCommand(_) => responses::WRONG_COMMAND,
    }
}
