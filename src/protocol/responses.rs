//! Chat response texts
//!
//! Every string the server sends on its own behalf.

pub const NOT_REGISTERED: &str = "You must register name to send any messages";
pub const NAME_TAKEN: &str = "Name already registered";
pub const INVALID_NAME: &str = "Names must be alphanumeric of maximum 20 characters";
pub const NO_SUCH_USER: &str = "No such user registered";
pub const WRONG_COMMAND: &str = "Wrong Command";
pub const COMMAND_TOO_LONG: &str = "Command too long";
pub const TOO_MANY_CONNECTIONS: &str = "Too many connections. Try again later.";

/// Sent to every open connection when the server stops
pub const SHUTDOWN_TOKEN: &str = "halt";

/// Sent unsolicited on connect and in answer to `help`
pub const HELP_TEXT: &str = "Command List
1 - Quit server (\"quit\")
2 - Show all users (\"active\")
3 - Message all users (\"all <msg>\")
4 - Message a specific user (\"m-<username> <msg>\")
5 - Register your name (\"reg <name>\"), names must be alphanumeric of maximum 20 characters
6 - Show this command list (\"help\")";

/// Reply to a successful `reg`
pub fn registered(name: &str) -> String {
    format!("{} Registered", name)
}

/// Body of a broadcast or direct message
pub fn chat_line(sender: &str, text: &str) -> String {
    format!("{}: {}", sender, text)
}

/// Reply to `active`
pub fn roster(names: &[String]) -> String {
    names.join("\n")
}
