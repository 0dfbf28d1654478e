//! Command handlers module for the RAX chat server.
//!
//! Routes a parsed command for one connection. The connection's state
//! (unregistered or registered) is read under the same registry lock that
//! resolves the command; the resulting messages are sent only after the lock
//! has been released.

use log::{debug, error, info};

use crate::client::{ClientHandle, ConnectionId, Registry, SharedRegistry};
use crate::error::{ChatError, error_to_reply};
use crate::protocol::responses;
use crate::protocol::{Command, CommandResult, CommandStatus, Delivery};
use crate::utils::logging::log_command;

/// Dispatches a received command to its corresponding handler.
///
/// # Arguments
///
/// * `registry` - The shared connection registry.
/// * `id` - Connection that sent the command.
/// * `command` - The parsed command.
///
/// # Returns
///
/// * `CommandResult` - Messages to deliver and whether the connection stays open.
pub async fn handle_command(
    registry: &SharedRegistry,
    id: ConnectionId,
    command: &Command,
) -> CommandResult {
    log_command(id, command);

    let mut guard = registry.lock().await;

    let (caller, sender) = match guard.get(id) {
        Some(record) => (record.handle().clone(), record.name().map(str::to_string)),
        None => {
            error!("Client {} not found in registry", id);
            return CommandResult::close();
        }
    };

    let outcome = match &sender {
        Some(sender) => handle_registered(&guard, id, &caller, sender, command),
        None => handle_unregistered(&mut guard, id, &caller, command),
    };
    drop(guard);

    match outcome {
        Ok(result) => result,
        Err(e) => {
            debug!("Client {} command rejected: {}", id, e);
            CommandResult::reply(caller, error_to_reply(&e))
        }
    }
}

/// Before registration only `reg` is honored; every other verb, `help` and
/// `quit` included, is refused without a state change.
fn handle_unregistered(
    registry: &mut Registry,
    id: ConnectionId,
    caller: &ClientHandle,
    command: &Command,
) -> Result<CommandResult, ChatError> {
    match command {
        Command::Register(name) => handle_cmd_reg(registry, id, caller, name),
        Command::Active
        | Command::All(_)
        | Command::Direct { .. }
        | Command::Help
        | Command::Quit
        | Command::Unknown(_) => Err(ChatError::NotRegistered),
    }
}

fn handle_registered(
    registry: &Registry,
    id: ConnectionId,
    caller: &ClientHandle,
    sender: &str,
    command: &Command,
) -> Result<CommandResult, ChatError> {
    match command {
        Command::Active => Ok(handle_cmd_active(registry, caller)),
        Command::All(text) => Ok(handle_cmd_all(registry, sender, text)),
        Command::Direct { target, text } => handle_cmd_direct(registry, sender, target, text),
        Command::Help => Ok(handle_cmd_help(caller)),
        Command::Quit => Ok(handle_cmd_quit(id)),
        Command::Register(_) => Err(ChatError::UnknownCommand("reg".into())),
        Command::Unknown(verb) => Err(ChatError::UnknownCommand(verb.clone())),
    }
}

/// Handles `reg <name>`: claims the name for this connection.
fn handle_cmd_reg(
    registry: &mut Registry,
    id: ConnectionId,
    caller: &ClientHandle,
    name: &str,
) -> Result<CommandResult, ChatError> {
    registry.register(id, name)?;
    info!("Client {} registered as {}", id, name);
    Ok(CommandResult::reply(caller.clone(), responses::registered(name)))
}

/// Handles `active`: replies with every registered name, one per line.
fn handle_cmd_active(registry: &Registry, caller: &ClientHandle) -> CommandResult {
    let names = registry.list_names();
    CommandResult::reply(caller.clone(), responses::roster(&names))
}

/// Handles `all <text>`: fans the message out to every connection, sender included.
fn handle_cmd_all(registry: &Registry, sender: &str, text: &str) -> CommandResult {
    let line = responses::chat_line(sender, text);
    let deliveries = registry
        .all()
        .map(|record| Delivery {
            to: record.handle().clone(),
            text: line.clone(),
        })
        .collect();

    CommandResult {
        status: CommandStatus::Continue,
        deliveries,
    }
}

/// Handles `m-<target> <text>`: delivers to the named connection only.
fn handle_cmd_direct(
    registry: &Registry,
    sender: &str,
    target: &str,
    text: &str,
) -> Result<CommandResult, ChatError> {
    let recipient = registry
        .lookup_by_name(target)
        .and_then(|target_id| registry.get(target_id))
        .ok_or_else(|| ChatError::UnknownTarget(target.to_string()))?;

    Ok(CommandResult::reply(
        recipient.handle().clone(),
        responses::chat_line(sender, text),
    ))
}

fn handle_cmd_help(caller: &ClientHandle) -> CommandResult {
    CommandResult::reply(caller.clone(), responses::HELP_TEXT)
}

/// Handles `quit`: the session loop tears the connection down.
fn handle_cmd_quit(id: ConnectionId) -> CommandResult {
    info!("Client {} requested to quit", id);
    CommandResult::close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Outbound;
    use crate::protocol::parse_command;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    async fn connect(registry: &SharedRegistry) -> (ConnectionId, UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.lock().await.connect(ClientHandle::new(tx));
        (id, rx)
    }

    async fn send(registry: &SharedRegistry, id: ConnectionId, line: &str) -> CommandStatus {
        let result = handle_command(registry, id, &parse_command(line)).await;
        result.deliver();
        result.status
    }

    fn drain(rx: &mut UnboundedReceiver<Outbound>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(item) = rx.try_recv() {
            if let Outbound::Line(text) = item {
                lines.push(text);
            }
        }
        lines
    }

    async fn registered(
        registry: &SharedRegistry,
        name: &str,
    ) -> (ConnectionId, UnboundedReceiver<Outbound>) {
        let (id, mut rx) = connect(registry).await;
        send(registry, id, &format!("reg {}", name)).await;
        assert_eq!(drain(&mut rx), vec![format!("{} Registered", name)]);
        (id, rx)
    }

    #[tokio::test]
    async fn test_register_success() {
        let registry = Registry::shared();
        let (id, mut rx) = connect(&registry).await;

        assert_eq!(send(&registry, id, "reg bob").await, CommandStatus::Continue);
        assert_eq!(drain(&mut rx), vec!["bob Registered"]);
        assert!(registry.lock().await.is_registered(id));
    }

    #[tokio::test]
    async fn test_register_name_taken() {
        let registry = Registry::shared();
        let (_a, _rx_a) = registered(&registry, "bob").await;
        let (b, mut rx_b) = connect(&registry).await;

        send(&registry, b, "reg bob").await;
        assert_eq!(drain(&mut rx_b), vec!["Name already registered"]);
        assert!(!registry.lock().await.is_registered(b));
    }

    #[tokio::test]
    async fn test_register_invalid_names() {
        let registry = Registry::shared();
        let (id, mut rx) = connect(&registry).await;

        for line in ["reg two words", "reg bob!", "reg", "reg a23456789012345678901"] {
            send(&registry, id, line).await;
            assert_eq!(
                drain(&mut rx),
                vec!["Names must be alphanumeric of maximum 20 characters"],
                "line {:?}",
                line
            );
        }
        assert!(registry.lock().await.list_names().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_cannot_broadcast() {
        let registry = Registry::shared();
        let (_a, mut rx_a) = registered(&registry, "alice").await;
        let (b, mut rx_b) = connect(&registry).await;

        send(&registry, b, "all hi").await;
        assert_eq!(
            drain(&mut rx_b),
            vec!["You must register name to send any messages"]
        );
        assert!(drain(&mut rx_a).is_empty());

        for line in ["active", "m-alice hi", "dance"] {
            send(&registry, b, line).await;
            assert_eq!(
                drain(&mut rx_b),
                vec!["You must register name to send any messages"]
            );
        }
    }

    #[tokio::test]
    async fn test_help_and_quit_refused_before_registration() {
        let registry = Registry::shared();
        let (id, mut rx) = connect(&registry).await;

        for line in ["help", "quit"] {
            assert_eq!(send(&registry, id, line).await, CommandStatus::Continue);
            assert_eq!(
                drain(&mut rx),
                vec!["You must register name to send any messages"]
            );
        }
        assert_eq!(registry.lock().await.active_count(), 1);
        assert!(!registry.lock().await.is_registered(id));
    }

    #[tokio::test]
    async fn test_help_after_registration() {
        let registry = Registry::shared();
        let (id, mut rx) = registered(&registry, "alice").await;

        assert_eq!(send(&registry, id, "help").await, CommandStatus::Continue);
        assert_eq!(drain(&mut rx), vec![responses::HELP_TEXT]);
    }

    #[tokio::test]
    async fn test_broadcast_fan_out() {
        let registry = Registry::shared();
        let (a, mut rx_a) = registered(&registry, "A").await;
        let (_b, mut rx_b) = registered(&registry, "B").await;
        let (_c, mut rx_c) = registered(&registry, "C").await;

        send(&registry, a, "all hello").await;
        assert_eq!(drain(&mut rx_a), vec!["A: hello"]);
        assert_eq!(drain(&mut rx_b), vec!["A: hello"]);
        assert_eq!(drain(&mut rx_c), vec!["A: hello"]);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_unregistered_connections() {
        let registry = Registry::shared();
        let (a, _rx_a) = registered(&registry, "A").await;
        let (_pending, mut rx_pending) = connect(&registry).await;

        send(&registry, a, "all hello").await;
        assert_eq!(drain(&mut rx_pending), vec!["A: hello"]);
    }

    #[tokio::test]
    async fn test_direct_message() {
        let registry = Registry::shared();
        let (a, mut rx_a) = registered(&registry, "A").await;
        let (_b, mut rx_b) = registered(&registry, "B").await;
        let (_c, mut rx_c) = registered(&registry, "C").await;

        send(&registry, a, "m-B hi").await;
        assert_eq!(drain(&mut rx_b), vec!["A: hi"]);
        assert!(drain(&mut rx_a).is_empty());
        assert!(drain(&mut rx_c).is_empty());

        send(&registry, a, "m-ghost hi").await;
        assert_eq!(drain(&mut rx_a), vec!["No such user registered"]);
        assert!(drain(&mut rx_b).is_empty());
    }

    #[tokio::test]
    async fn test_active_lists_registered_names() {
        let registry = Registry::shared();
        let (a, mut rx_a) = registered(&registry, "alice").await;
        let (_b, _rx_b) = registered(&registry, "bob").await;
        let (_pending, _rx_pending) = connect(&registry).await;

        send(&registry, a, "active").await;
        assert_eq!(drain(&mut rx_a), vec!["alice\nbob"]);
    }

    #[tokio::test]
    async fn test_registered_wrong_command() {
        let registry = Registry::shared();
        let (a, mut rx_a) = registered(&registry, "alice").await;

        for line in ["dance", "reg alice2", "ALL hi", ""] {
            send(&registry, a, line).await;
            assert_eq!(drain(&mut rx_a), vec!["Wrong Command"], "line {:?}", line);
        }
        assert_eq!(registry.lock().await.lookup_by_name("alice2"), None);
    }

    #[tokio::test]
    async fn test_registered_quit_closes() {
        let registry = Registry::shared();
        let (a, _rx_a) = registered(&registry, "alice").await;

        assert_eq!(
            send(&registry, a, "quit").await,
            CommandStatus::CloseConnection
        );
    }

    #[tokio::test]
    async fn test_unknown_connection_is_closed() {
        let registry = Registry::shared();
        let result = handle_command(&registry, ConnectionId::new(99), &Command::Help).await;

        assert_eq!(result.status, CommandStatus::CloseConnection);
        assert!(result.deliveries.is_empty());
    }
}
